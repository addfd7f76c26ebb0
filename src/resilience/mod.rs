//! Retry and timeout execution.
//!
//! This module provides:
//! - [`RetryPolicy`]: attempt budget, exponential backoff, jitter, timeout
//! - [`ResilienceExecutor`]: runs an async operation under a policy
//! - [`with_timeout`]: a bare timeout race when no retry is wanted
//! - [`JitterSource`]: injectable randomness for backoff jitter
//!
//! # Example
//!
//! ```
//! use pulsecheck::error::ProbeFailure;
//! use pulsecheck::resilience::{ResilienceExecutor, RetryPolicy};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let executor = ResilienceExecutor::new();
//! let policy = RetryPolicy::new(3).with_base_delay(Duration::from_millis(1));
//!
//! let value = executor
//!     .execute_with_retry(|| async { Ok::<_, ProbeFailure>(42) }, &policy)
//!     .await;
//! assert_eq!(value.ok(), Some(42));
//! # }
//! ```

mod executor;
mod jitter;
mod policy;

pub use executor::{execute_with_retry, with_timeout, ResilienceExecutor};
pub use jitter::{JitterSource, NoJitter, RandomJitter};
pub use policy::{
    RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_JITTER_FACTOR, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DELAY_MS,
};
