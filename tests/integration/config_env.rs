//! Configuration loading tests.
//!
//! Environment variables are process-global, so every test is serial.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::env;
use std::time::Duration;

use pulsecheck::config::Config;
use pulsecheck::error::{AppError, ConfigError};
use serial_test::serial;

const VARS: &[&str] = &[
    "HEALTH_CHECK_DEPENDENCIES",
    "HEALTH_PROBE_TIMEOUT_MS",
    "DATASTORE_URL",
    "DATASTORE_API_KEY",
    "RETRY_MAX_ATTEMPTS",
    "RETRY_JITTER_FACTOR",
    "PERF_MAX_SAMPLES",
    "PERF_RETENTION_SECS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_env_flows_into_component_settings() {
    clear_env();
    env::set_var("HEALTH_CHECK_DEPENDENCIES", "0");
    env::set_var("HEALTH_PROBE_TIMEOUT_MS", "750");
    env::set_var("RETRY_MAX_ATTEMPTS", "4");
    env::set_var("PERF_MAX_SAMPLES", "10");
    env::set_var("PERF_RETENTION_SECS", "120");

    let config = Config::from_env().unwrap();

    let health = config.health_config();
    assert!(!health.dependency_checks_enabled);
    assert_eq!(health.probe_timeout, Duration::from_millis(750));
    assert_eq!(config.retry_policy().max_attempts, 4);
    let monitor = config.monitor_config();
    assert_eq!(monitor.max_samples, 10);
    assert_eq!(monitor.retention, Duration::from_secs(120));

    clear_env();
}

#[test]
#[serial]
fn test_out_of_range_values_are_rejected() {
    clear_env();
    env::set_var("RETRY_JITTER_FACTOR", "1.5");

    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "RETRY_JITTER_FACTOR"));

    let app_err = AppError::from(err);
    assert!(app_err.to_string().starts_with("Configuration error:"));

    clear_env();
}

#[test]
#[serial]
fn test_zero_attempts_rejected() {
    clear_env();
    env::set_var("RETRY_MAX_ATTEMPTS", "0");

    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "RETRY_MAX_ATTEMPTS"));

    clear_env();
}
