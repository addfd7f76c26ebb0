//! Closure-backed probe.

use std::future::Future;

use async_trait::async_trait;

use crate::error::ProbeFailure;
use crate::health::DependencyProbe;

/// Adapts an async closure into a [`DependencyProbe`].
///
/// # Example
///
/// ```
/// use pulsecheck::health::DependencyProbe;
/// use pulsecheck::probes::FnProbe;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let probe = FnProbe::new("queue", || async { Ok(Some(true)) });
/// assert_eq!(probe.name(), "queue");
/// assert_eq!(probe.check().await, Ok(Some(true)));
/// # }
/// ```
pub struct FnProbe<F> {
    name: String,
    check: F,
}

impl<F> std::fmt::Debug for FnProbe<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnProbe")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F, Fut> FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<bool>, ProbeFailure>> + Send,
{
    /// Wrap `check` under `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

#[async_trait]
impl<F, Fut> DependencyProbe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<bool>, ProbeFailure>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<Option<bool>, ProbeFailure> {
        (self.check)().await
    }
}
