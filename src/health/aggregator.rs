//! Runs dependency probes and reduces them to one status.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;

use super::probe::DependencyProbe;
use super::types::{HealthConfig, HealthStatus, ServiceHealth, CONNECTION_CHECK_FAILED};
use crate::error::{AttemptError, RetryError};
use crate::monitor::PerformanceMonitor;
use crate::resilience::{ResilienceExecutor, RetryPolicy};
use crate::time::millis;

/// Operation name under which each full health check is measured.
pub const HEALTH_CHECK_OPERATION: &str = "health.check";

/// Runs every registered [`DependencyProbe`] and builds a [`HealthStatus`].
///
/// Each probe gets a single attempt bounded by
/// [`HealthConfig::probe_timeout`]; every failure becomes a `down`
/// [`ServiceHealth`], so [`HealthAggregator::perform_health_check`] never
/// fails. Probes are measured as `health.<name>` and the whole check as
/// `health.check`.
///
/// # Example
///
/// ```
/// use pulsecheck::health::{HealthAggregator, HealthConfig, OverallStatus};
/// use pulsecheck::monitor::PerformanceMonitor;
/// use pulsecheck::probes::FnProbe;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let monitor = Arc::new(PerformanceMonitor::with_defaults());
/// let aggregator = HealthAggregator::new(HealthConfig::default(), Arc::clone(&monitor))
///     .with_probe(Arc::new(FnProbe::new("datastore", || async { Ok(Some(true)) })));
///
/// let status = aggregator.perform_health_check().await;
/// assert_eq!(status.status, OverallStatus::Healthy);
/// assert!(monitor.get_stats("health.datastore").is_some());
/// # }
/// ```
pub struct HealthAggregator {
    config: HealthConfig,
    monitor: Arc<PerformanceMonitor>,
    executor: ResilienceExecutor,
    probes: Vec<Arc<dyn DependencyProbe>>,
}

impl std::fmt::Debug for HealthAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthAggregator")
            .field("config", &self.config)
            .field("probes", &self.probe_names())
            .finish_non_exhaustive()
    }
}

impl HealthAggregator {
    /// Create an aggregator with no probes.
    #[must_use]
    pub fn new(config: HealthConfig, monitor: Arc<PerformanceMonitor>) -> Self {
        Self {
            config,
            monitor,
            executor: ResilienceExecutor::new(),
            probes: Vec::new(),
        }
    }

    /// Use `executor` to run probes.
    #[must_use]
    pub fn with_executor(mut self, executor: ResilienceExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Add a probe, by value.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn DependencyProbe>) -> Self {
        self.register(probe);
        self
    }

    /// Add a probe. Results are reported in registration order.
    pub fn register(&mut self, probe: Arc<dyn DependencyProbe>) {
        tracing::debug!(probe = probe.name(), "Registered dependency probe");
        self.probes.push(probe);
    }

    /// Names of the registered probes.
    #[must_use]
    pub fn probe_names(&self) -> Vec<&str> {
        self.probes.iter().map(|probe| probe.name()).collect()
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// The monitor probes are measured into.
    #[must_use]
    pub const fn monitor(&self) -> &Arc<PerformanceMonitor> {
        &self.monitor
    }

    /// Run every probe concurrently and reduce the results.
    ///
    /// With dependency checks disabled no probe is invoked and the result is
    /// healthy with an empty service list.
    pub async fn perform_health_check(&self) -> HealthStatus {
        let span = self.monitor.start_measurement(HEALTH_CHECK_OPERATION);

        let services = if self.config.dependency_checks_enabled {
            join_all(self.probes.iter().map(|probe| self.run_probe(probe.as_ref()))).await
        } else {
            tracing::debug!("Dependency checks disabled, skipping probes");
            Vec::new()
        };

        let status = HealthStatus::from_services(Utc::now(), services);
        span.with_metadata("status", status.status.as_str())
            .with_metadata("services", status.services.len())
            .end(None);

        tracing::info!(
            status = %status.status,
            services = status.services.len(),
            "Health check completed"
        );
        status
    }

    async fn run_probe(&self, probe: &dyn DependencyProbe) -> ServiceHealth {
        let name = probe.name();
        let span = self.monitor.start_measurement(format!("health.{name}"));
        let policy = RetryPolicy::timeout_only(self.config.probe_timeout);

        let result = self
            .executor
            .execute_with_retry(|| probe.check(), &policy)
            .await;

        let service = match result {
            Ok(Some(true)) => {
                let elapsed = span.end(None);
                ServiceHealth::up(name, millis(elapsed))
            }
            Ok(Some(false) | None) => {
                let elapsed = span.end_with_error(CONNECTION_CHECK_FAILED, None);
                ServiceHealth::down(name, millis(elapsed), CONNECTION_CHECK_FAILED)
            }
            Err(RetryError { last, .. }) => {
                let message = match last {
                    AttemptError::TimedOut(timeout) => timeout.to_string(),
                    AttemptError::Failed(failure) => failure.describe(),
                };
                let elapsed = span.end_with_error(&message, None);
                ServiceHealth::down(name, millis(elapsed), message)
            }
        };

        tracing::debug!(
            probe = name,
            status = ?service.status,
            response_time_ms = service.response_time_ms,
            error = service.error.as_deref(),
            "Probe finished"
        );
        service
    }
}
