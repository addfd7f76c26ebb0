//! Randomness for backoff jitter.

use uuid::Uuid;

/// Source of jitter samples uniformly distributed in `[-1, 1]`.
///
/// Injected into [`super::ResilienceExecutor`] so tests can pin the
/// randomness.
#[cfg_attr(test, mockall::automock)]
pub trait JitterSource: Send + Sync {
    /// Draw one sample in `[-1, 1]`.
    fn sample(&self) -> f64;
}

/// Draws samples from the random bits of a v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

/// 53 bits fill an `f64` mantissa exactly.
const MANTISSA_BITS: u32 = 53;

impl JitterSource for RandomJitter {
    #[allow(clippy::cast_precision_loss)]
    fn sample(&self) -> f64 {
        // The low word only has its two variant bits fixed, at the top.
        let (_, low) = Uuid::new_v4().as_u64_pair();
        let bits = low & ((1_u64 << MANTISSA_BITS) - 1);
        let unit = bits as f64 / (1_u64 << MANTISSA_BITS) as f64;
        unit.mul_add(2.0, -1.0)
    }
}

/// Always returns zero: deterministic backoff.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn sample(&self) -> f64 {
        0.0
    }
}
