//! Configuration validation.
//!
//! This module provides validation logic for configuration values,
//! ensuring they are within acceptable ranges.

use super::Config;
use crate::error::ConfigError;

/// Maximum allowed probe timeout in milliseconds (5 minutes).
pub const MAX_PROBE_TIMEOUT_MS: u64 = 300_000;

/// Maximum allowed attempt count.
pub const MAX_ATTEMPTS: u32 = 10;

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if any value is out of range:
/// - `HEALTH_PROBE_TIMEOUT_MS` must not exceed 300000
/// - `RETRY_MAX_ATTEMPTS` must be between 1 and 10
/// - `RETRY_BASE_DELAY_MS` must not exceed `RETRY_MAX_DELAY_MS`
/// - `RETRY_JITTER_FACTOR` must be within `[0, 1]`
/// - `PERF_MAX_SAMPLES` must be at least 1
/// - `PERF_WARNING_THRESHOLD_MS` must be below `PERF_ERROR_THRESHOLD_MS`
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.probe_timeout_ms > MAX_PROBE_TIMEOUT_MS {
        return Err(invalid(
            "HEALTH_PROBE_TIMEOUT_MS",
            format!("must not exceed {MAX_PROBE_TIMEOUT_MS} ms"),
        ));
    }

    if config.retry_max_attempts == 0 || config.retry_max_attempts > MAX_ATTEMPTS {
        return Err(invalid(
            "RETRY_MAX_ATTEMPTS",
            format!("must be between 1 and {MAX_ATTEMPTS}"),
        ));
    }

    if config.retry_base_delay_ms > config.retry_max_delay_ms {
        return Err(invalid(
            "RETRY_BASE_DELAY_MS",
            "must not exceed RETRY_MAX_DELAY_MS",
        ));
    }

    if !(0.0..=1.0).contains(&config.retry_jitter_factor) {
        return Err(invalid("RETRY_JITTER_FACTOR", "must be between 0 and 1"));
    }

    if config.perf_max_samples == 0 {
        return Err(invalid("PERF_MAX_SAMPLES", "must be at least 1"));
    }

    if config.perf_warning_threshold_ms >= config.perf_error_threshold_ms {
        return Err(invalid(
            "PERF_WARNING_THRESHOLD_MS",
            "must be below PERF_ERROR_THRESHOLD_MS",
        ));
    }

    Ok(())
}

fn invalid(var: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.into(),
        reason: reason.into(),
    }
}
