//! Pulsecheck binary entry point.
//!
//! Runs one health check against the configured dependencies and prints
//! `{"health": ..., "performance": ...}` to stdout. All logs go to stderr.
//!
//! Exit codes: 0 healthy or degraded, 1 unhealthy, 2 configuration error.
//!
//! Coverage is excluded because the main function only wires together
//! components that are tested individually.

// Enable the coverage attribute when running with nightly for llvm-cov exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::process::ExitCode;
use std::sync::Arc;

use pulsecheck::config::{Config, LogFormat};
use pulsecheck::error::AppError;
use pulsecheck::health::{HealthAggregator, HealthStatus};
use pulsecheck::monitor::PerformanceMonitor;
use pulsecheck::probes::HttpProbe;
use tracing_subscriber::EnvFilter;

#[cfg_attr(coverage_nightly, coverage(off))]
fn init_logging(level: &str, format: LogFormat) {
    let filter = level
        .parse()
        .unwrap_or_else(|_| EnvFilter::new(pulsecheck::config::DEFAULT_LOG_LEVEL));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
async fn run(config: &Config) -> Result<HealthStatus, AppError> {
    let monitor = Arc::new(PerformanceMonitor::new(config.monitor_config()));
    let mut aggregator = HealthAggregator::new(config.health_config(), Arc::clone(&monitor));
    if let Some(probe) = HttpProbe::from_config(config)? {
        aggregator.register(Arc::new(probe));
    }

    let health = aggregator.perform_health_check().await;
    monitor.check_alerts();

    let output = serde_json::json!({
        "health": &health,
        "performance": monitor.report(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(health)
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_logging(pulsecheck::config::DEFAULT_LOG_LEVEL, LogFormat::Text);
            tracing::error!("Configuration error: {e}");
            return ExitCode::from(2);
        }
    };
    init_logging(&config.log_level, config.log_format);

    tracing::info!(
        dependency_checks = config.dependency_checks_enabled,
        probe_timeout_ms = config.probe_timeout_ms,
        datastore = config.datastore_url.is_some(),
        "pulsecheck starting"
    );
    tracing::debug!(
        retry_policy = ?config.retry_policy(),
        "Default retry policy for library callers"
    );

    match run(&config).await {
        Ok(health) if health.status.is_available() => ExitCode::SUCCESS,
        Ok(health) => {
            tracing::warn!(status = %health.status, "System is unhealthy");
            ExitCode::from(1)
        }
        Err(e) => {
            tracing::error!("Health check error: {e}");
            ExitCode::from(1)
        }
    }
}
