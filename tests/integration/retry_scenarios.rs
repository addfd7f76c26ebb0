//! Retry and timeout scenarios.
//!
//! All timing runs on tokio's paused clock, so elapsed times are exact.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pulsecheck::error::{AttemptError, ProbeFailure};
use pulsecheck::resilience::{with_timeout, NoJitter, ResilienceExecutor, RetryPolicy};
use tokio::time::Instant;
use tokio_test::assert_err;

fn executor() -> ResilienceExecutor {
    ResilienceExecutor::with_jitter(Arc::new(NoJitter))
}

fn policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts)
        .with_base_delay(Duration::from_millis(10))
        .with_max_delay(Duration::from_millis(100))
        .with_jitter_factor(0.0)
}

#[tokio::test(start_paused = true)]
async fn test_fails_twice_then_succeeds() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let start = Instant::now();

    let result = executor()
        .execute_with_retry(
            || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(ProbeFailure::error(format!("attempt {n} failed")))
                    } else {
                        Ok("connected")
                    }
                }
            },
            &policy(3),
        )
        .await;

    assert_eq!(result.unwrap(), "connected");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_invokes_exactly_n_times() {
    for n in 1..=5 {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let err = executor()
            .execute_with_retry(
                || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Err::<(), _>(ProbeFailure::Unknown) }
                },
                &policy(n),
            )
            .await
            .unwrap_err();

        assert_eq!(err.attempts, n);
        assert_eq!(calls.load(Ordering::SeqCst), n);
        assert_eq!(err.last, AttemptError::Failed(ProbeFailure::Unknown));
    }
}

#[tokio::test(start_paused = true)]
async fn test_backoff_is_capped_at_max_delay() {
    let start = Instant::now();
    let policy = RetryPolicy::new(5)
        .with_base_delay(Duration::from_millis(40))
        .with_max_delay(Duration::from_millis(50))
        .with_jitter_factor(0.0);

    let result: Result<(), _> = executor()
        .execute_with_retry(|| async { Err(ProbeFailure::Unknown) }, &policy)
        .await;

    assert_err!(result);
    // 40 + 50 + 50 + 50
    assert_eq!(start.elapsed(), Duration::from_millis(190));
}

#[tokio::test(start_paused = true)]
async fn test_timeouts_are_retried_and_reported() {
    let policy = policy(2).with_timeout(Duration::from_millis(100));

    let err = executor()
        .execute_with_retry(
            || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, ProbeFailure>(())
            },
            &policy,
        )
        .await
        .unwrap_err();

    assert_eq!(err.attempts, 2);
    assert!(err.timed_out());
    assert_eq!(
        err.to_string(),
        "Operation failed after 2 attempt(s): Timeout after 100ms"
    );
}

#[tokio::test(start_paused = true)]
async fn test_zero_timeout_never_succeeds() {
    let err = with_timeout(async { 1 }, Duration::ZERO).await.unwrap_err();
    assert_eq!(err.timeout_ms, 0);

    let err = executor()
        .execute_with_retry(
            || async { Ok::<_, ProbeFailure>(1) },
            &RetryPolicy::timeout_only(Duration::ZERO),
        )
        .await
        .unwrap_err();
    assert_eq!(err.attempts, 1);
    assert!(err.timed_out());
}

#[tokio::test]
async fn test_dropping_the_retry_cancels_it() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let slow_policy = RetryPolicy::new(10)
        .with_base_delay(Duration::from_secs(60))
        .with_jitter_factor(0.0);

    let exec = executor();
    let retry = exec.execute_with_retry(
        || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(ProbeFailure::Unknown) }
        },
        &slow_policy,
    );

    assert!(with_timeout(retry, Duration::from_millis(20)).await.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
