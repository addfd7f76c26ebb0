//! Dependency probe abstraction.

use async_trait::async_trait;

use crate::error::ProbeFailure;

/// A connectivity check against one dependency.
///
/// Implementations must eventually settle; the aggregator bounds the wait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    /// Dependency name, reported in [`super::ServiceHealth::name`].
    fn name(&self) -> &str;

    /// Check connectivity.
    ///
    /// `Ok(Some(true))` means up. `Ok(Some(false))` and `Ok(None)` both mean
    /// the dependency answered without confirming connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeFailure`] if the check itself failed.
    async fn check(&self) -> Result<Option<bool>, ProbeFailure>;
}
