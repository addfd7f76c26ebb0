//! Retry policy and backoff arithmetic.

use std::time::Duration;

/// Default maximum attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default base delay in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 100;
/// Default backoff ceiling in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 5_000;
/// Default jitter factor.
pub const DEFAULT_JITTER_FACTOR: f64 = 0.1;

/// How an operation is retried. Immutable for the duration of one call.
///
/// # Example
///
/// ```
/// use pulsecheck::resilience::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3)
///     .with_base_delay(Duration::from_millis(10))
///     .with_max_delay(Duration::from_millis(100))
///     .with_jitter_factor(0.0);
///
/// assert_eq!(policy.backoff_delay(1, 0.0), Duration::from_millis(10));
/// assert_eq!(policy.backoff_delay(2, 0.0), Duration::from_millis(20));
/// assert_eq!(policy.backoff_delay(6, 0.0), Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Upper bound for the exponential delay, before jitter.
    pub max_delay: Duration,
    /// Fraction of the delay used as the jitter amplitude, in `[0, 1]`.
    pub jitter_factor: f64,
    /// Per-attempt timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            jitter_factor: DEFAULT_JITTER_FACTOR,
            timeout: None,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and default delays.
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// A single try with no retries and no timeout.
    #[must_use]
    pub fn single_attempt() -> Self {
        Self::new(1)
    }

    /// A single try bounded by `timeout`. Used for health probes.
    #[must_use]
    pub fn timeout_only(timeout: Duration) -> Self {
        Self::single_attempt().with_timeout(timeout)
    }

    /// Set the base delay.
    #[must_use]
    pub const fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the delay ceiling.
    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the jitter factor, clamped into `[0, 1]`.
    #[must_use]
    pub fn with_jitter_factor(mut self, jitter_factor: f64) -> Self {
        self.jitter_factor = if jitter_factor.is_nan() {
            0.0
        } else {
            jitter_factor.clamp(0.0, 1.0)
        };
        self
    }

    /// Set the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attempt budget, never below 1.
    #[must_use]
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    ///
    /// `min(base * 2^(attempt-1), max)` plus `delay * jitter_factor * sample`,
    /// clamped to zero. `sample` is expected in `[-1, 1]`; values outside are
    /// clamped and non-finite values count as zero.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32, sample: f64) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let exponential = self.base_delay.as_secs_f64() * f64::from(1_u32 << exponent);
        let capped = exponential.min(self.max_delay.as_secs_f64());

        let sample = if sample.is_finite() {
            sample.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let jitter_factor = if self.jitter_factor.is_nan() {
            0.0
        } else {
            self.jitter_factor.clamp(0.0, 1.0)
        };
        let delay = jitter_factor.mul_add(capped * sample, capped).max(0.0);

        Duration::try_from_secs_f64(delay).unwrap_or(self.max_delay)
    }
}
