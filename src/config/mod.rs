//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading (with `.env` support)
//! - Configuration validation
//! - Default value handling
//! - Conversion into the per-component settings ([`RetryPolicy`],
//!   [`MonitorConfig`], [`HealthConfig`])
//!
//! # Example
//!
//! ```
//! use pulsecheck::config::{Config, SecretString};
//!
//! let config = Config {
//!     datastore_url: Some("https://db.example.com/rest/v1/".to_string()),
//!     datastore_api_key: Some(SecretString::new("anon-key")),
//!     ..Config::default()
//! };
//!
//! assert_eq!(config.retry_policy().max_attempts, 3);
//! // API key is protected from accidental logging
//! let debug = format!("{:?}", config);
//! assert!(debug.contains("<REDACTED>"));
//! assert!(!debug.contains("anon-key"));
//! ```

mod secret;
mod validation;

pub use secret::SecretString;
pub use validation::{validate_config, MAX_ATTEMPTS, MAX_PROBE_TIMEOUT_MS};

use std::time::Duration;

use crate::error::ConfigError;
use crate::health::{HealthConfig, DEFAULT_PROBE_TIMEOUT_MS};
use crate::monitor::{
    MonitorConfig, DEFAULT_ERROR_THRESHOLD_MS, DEFAULT_MAX_SAMPLES, DEFAULT_RETENTION_SECS,
    DEFAULT_WARNING_THRESHOLD_MS,
};
use crate::resilience::{
    RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_JITTER_FACTOR, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DELAY_MS,
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                var: "LOG_FORMAT".into(),
                reason: "must be one of: text, json".into(),
            }),
        }
    }
}

/// Application configuration.
///
/// Use [`Config::from_env`] to load configuration from environment variables.
/// The datastore API key uses [`SecretString`] to prevent accidental logging.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Log level (error, warn, info, debug, trace) or a full filter directive.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// Whether dependency probes run at all.
    pub dependency_checks_enabled: bool,
    /// Per-probe timeout in milliseconds.
    pub probe_timeout_ms: u64,
    /// Datastore endpoint probed for connectivity.
    pub datastore_url: Option<String>,
    /// Datastore API key (protected from logging via [`SecretString`]).
    pub datastore_api_key: Option<SecretString>,
    /// Maximum attempts for retried operations.
    pub retry_max_attempts: u32,
    /// Base backoff delay in milliseconds.
    pub retry_base_delay_ms: u64,
    /// Backoff ceiling in milliseconds.
    pub retry_max_delay_ms: u64,
    /// Jitter factor in `[0, 1]`.
    pub retry_jitter_factor: f64,
    /// Measurement retention window in seconds.
    pub perf_retention_secs: u64,
    /// Maximum retained samples per operation.
    pub perf_max_samples: usize,
    /// Durations at or above this log at warning severity.
    pub perf_warning_threshold_ms: u64,
    /// Durations at or above this log at error severity.
    pub perf_error_threshold_ms: u64,
    /// Log sub-threshold measurements at info severity.
    pub perf_detailed_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::default(),
            dependency_checks_enabled: true,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            datastore_url: None,
            datastore_api_key: None,
            retry_max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_BASE_DELAY_MS,
            retry_max_delay_ms: DEFAULT_MAX_DELAY_MS,
            retry_jitter_factor: DEFAULT_JITTER_FACTOR,
            perf_retention_secs: DEFAULT_RETENTION_SECS,
            perf_max_samples: DEFAULT_MAX_SAMPLES,
            perf_warning_threshold_ms: DEFAULT_WARNING_THRESHOLD_MS,
            perf_error_threshold_ms: DEFAULT_ERROR_THRESHOLD_MS,
            perf_detailed_logging: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `LOG_LEVEL` (default: `info`), `LOG_FORMAT` (default: `text`)
    /// - `HEALTH_CHECK_DEPENDENCIES` (default: `true`)
    /// - `HEALTH_PROBE_TIMEOUT_MS` (default: `5000`)
    /// - `DATASTORE_URL`, `DATASTORE_API_KEY` (default: unset)
    /// - `RETRY_MAX_ATTEMPTS`, `RETRY_BASE_DELAY_MS`, `RETRY_MAX_DELAY_MS`,
    ///   `RETRY_JITTER_FACTOR`: defaults for library callers through
    ///   [`Config::retry_policy`]. The health check itself makes one attempt
    ///   per probe bounded by `HEALTH_PROBE_TIMEOUT_MS`.
    /// - `PERF_RETENTION_SECS`, `PERF_MAX_SAMPLES`,
    ///   `PERF_WARNING_THRESHOLD_MS`, `PERF_ERROR_THRESHOLD_MS`,
    ///   `PERF_DETAILED_LOGGING`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value does not parse or fails
    /// validation (see [`validate_config`]).
    #[must_use = "configuration should be used"]
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let config = Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into()),
            log_format: std::env::var("LOG_FORMAT")
                .map_or(Ok(LogFormat::default()), |val| val.parse())?,
            dependency_checks_enabled: parse_env_bool("HEALTH_CHECK_DEPENDENCIES", true)?,
            probe_timeout_ms: parse_env("HEALTH_PROBE_TIMEOUT_MS", DEFAULT_PROBE_TIMEOUT_MS)?,
            datastore_url: non_empty_env("DATASTORE_URL"),
            datastore_api_key: non_empty_env("DATASTORE_API_KEY").map(SecretString::new),
            retry_max_attempts: parse_env("RETRY_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            retry_base_delay_ms: parse_env("RETRY_BASE_DELAY_MS", DEFAULT_BASE_DELAY_MS)?,
            retry_max_delay_ms: parse_env("RETRY_MAX_DELAY_MS", DEFAULT_MAX_DELAY_MS)?,
            retry_jitter_factor: parse_env("RETRY_JITTER_FACTOR", DEFAULT_JITTER_FACTOR)?,
            perf_retention_secs: parse_env("PERF_RETENTION_SECS", DEFAULT_RETENTION_SECS)?,
            perf_max_samples: parse_env("PERF_MAX_SAMPLES", DEFAULT_MAX_SAMPLES)?,
            perf_warning_threshold_ms: parse_env(
                "PERF_WARNING_THRESHOLD_MS",
                DEFAULT_WARNING_THRESHOLD_MS,
            )?,
            perf_error_threshold_ms: parse_env(
                "PERF_ERROR_THRESHOLD_MS",
                DEFAULT_ERROR_THRESHOLD_MS,
            )?,
            perf_detailed_logging: parse_env_bool("PERF_DETAILED_LOGGING", false)?,
        };

        validate_config(&config)?;
        Ok(config)
    }

    /// The default retry policy for operations that want retries.
    ///
    /// Probes run by [`crate::health::HealthAggregator`] never retry and do
    /// not use this policy.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_max_attempts)
            .with_base_delay(Duration::from_millis(self.retry_base_delay_ms))
            .with_max_delay(Duration::from_millis(self.retry_max_delay_ms))
            .with_jitter_factor(self.retry_jitter_factor)
    }

    /// Settings for the performance monitor.
    #[must_use]
    pub const fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            retention: Duration::from_secs(self.perf_retention_secs),
            max_samples: self.perf_max_samples,
            warning_threshold: Duration::from_millis(self.perf_warning_threshold_ms),
            error_threshold: Duration::from_millis(self.perf_error_threshold_ms),
            detailed_logging: self.perf_detailed_logging,
        }
    }

    /// Settings for the health aggregator.
    #[must_use]
    pub const fn health_config(&self) -> HealthConfig {
        HealthConfig {
            dependency_checks_enabled: self.dependency_checks_enabled,
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
        }
    }
}

/// Read an environment variable, treating blank values as unset.
fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

/// Parse an environment variable, using a default if not set.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    non_empty_env(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: format!("could not parse {val:?}"),
        })
    })
}

/// Parse an environment variable as a boolean flag, using a default if not set.
fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    non_empty_env(name).map_or(Ok(default), |val| {
        parse_bool(&val).ok_or_else(|| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be one of: true, false, 1, 0, yes, no".into(),
        })
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
