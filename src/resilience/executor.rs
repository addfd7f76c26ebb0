//! Timeout racing and retry loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::jitter::{JitterSource, RandomJitter};
use super::policy::RetryPolicy;
use crate::error::{AttemptError, RetryError, TimeoutError};
use crate::time::millis;

/// Result of one raced attempt.
enum AttemptOutcome<T, E> {
    Ok(T),
    TimedOut,
    Failed(E),
}

impl<T, E> From<Result<T, E>> for AttemptOutcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(err) => Self::Failed(err),
        }
    }
}

/// Race `future` against `limit`. The loser is dropped, not awaited.
///
/// A zero limit never polls the future.
async fn race<F: Future>(future: F, limit: Duration) -> Option<F::Output> {
    if limit.is_zero() {
        return None;
    }
    tokio::select! {
        biased;
        () = tokio::time::sleep(limit) => None,
        output = future => Some(output),
    }
}

async fn run_attempt<T, E, Fut>(future: Fut, timeout: Option<Duration>) -> AttemptOutcome<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    match timeout {
        None => future.await.into(),
        Some(limit) => race(future, limit)
            .await
            .map_or(AttemptOutcome::TimedOut, AttemptOutcome::from),
    }
}

/// Wait for `future` for at most `timeout`.
///
/// When the timer fires first the future is dropped and
/// [`TimeoutError`] carries the configured limit.
///
/// # Errors
///
/// Returns [`TimeoutError`] if `future` does not complete within `timeout`.
///
/// # Example
///
/// ```
/// use pulsecheck::resilience::with_timeout;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let value = with_timeout(async { 7 }, Duration::from_secs(1)).await;
/// assert_eq!(value, Ok(7));
///
/// let err = with_timeout(std::future::pending::<()>(), Duration::from_millis(5))
///     .await
///     .unwrap_err();
/// assert_eq!(err.to_string(), "Timeout after 5ms");
/// # }
/// ```
pub async fn with_timeout<F: Future>(future: F, timeout: Duration) -> Result<F::Output, TimeoutError> {
    race(future, timeout)
        .await
        .ok_or_else(|| TimeoutError::new(millis(timeout)))
}

/// Runs operations under a [`RetryPolicy`].
///
/// Cloning is cheap; the jitter source is shared.
#[derive(Clone)]
pub struct ResilienceExecutor {
    jitter: Arc<dyn JitterSource>,
}

impl std::fmt::Debug for ResilienceExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilienceExecutor").finish_non_exhaustive()
    }
}

impl Default for ResilienceExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResilienceExecutor {
    /// Create an executor with random jitter.
    #[must_use]
    pub fn new() -> Self {
        Self::with_jitter(Arc::new(RandomJitter))
    }

    /// Create an executor drawing jitter from `jitter`.
    #[must_use]
    pub fn with_jitter(jitter: Arc<dyn JitterSource>) -> Self {
        Self { jitter }
    }

    /// Invoke `operation` until it succeeds or the policy's attempts run out.
    ///
    /// Each attempt is raced against `policy.timeout` when set. Between
    /// attempts the executor sleeps for [`RetryPolicy::backoff_delay`].
    /// Dropping the returned future cancels any pending sleep or attempt.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] with the attempt count and the last
    /// [`AttemptError`] once every attempt has failed.
    pub async fn execute_with_retry<T, E, F, Fut>(
        &self,
        mut operation: F,
        policy: &RetryPolicy,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + 'static,
    {
        let max_attempts = policy.effective_attempts();
        let mut attempt = 1;

        loop {
            let last = match run_attempt(operation(), policy.timeout).await {
                AttemptOutcome::Ok(value) => return Ok(value),
                AttemptOutcome::TimedOut => {
                    let timeout_ms = policy.timeout.map_or(0, millis);
                    tracing::debug!(attempt, timeout_ms, "Attempt timed out");
                    AttemptError::TimedOut(TimeoutError::new(timeout_ms))
                }
                AttemptOutcome::Failed(err) => AttemptError::Failed(err),
            };

            if attempt >= max_attempts {
                return Err(RetryError {
                    attempts: attempt,
                    last,
                });
            }

            let delay = policy.backoff_delay(attempt, self.jitter.sample());
            tracing::warn!(
                attempt,
                max_attempts,
                delay_ms = millis(delay),
                error = %last,
                "Attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// [`ResilienceExecutor::execute_with_retry`] with random jitter.
///
/// # Errors
///
/// Returns [`RetryError`] once every attempt has failed.
pub async fn execute_with_retry<T, E, F, Fut>(
    operation: F,
    policy: &RetryPolicy,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    ResilienceExecutor::new()
        .execute_with_retry(operation, policy)
        .await
}
