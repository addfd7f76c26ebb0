//! Thread-safe measurement store with statistics, alerting and housekeeping.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::alerts::{AlertEvent, AlertHandler, AlertRule, MAX_ALERT_HISTORY};
use super::percentile::compute_stats;
use super::span::MeasurementSpan;
use super::types::{Measurement, MonitorConfig, PerformanceReport, Stats};
use crate::time::millis;

/// Alert firings included in a [`PerformanceReport`].
const REPORT_ALERT_LIMIT: usize = 10;

/// Shortest period accepted by [`PerformanceMonitor::spawn_housekeeping`].
const MIN_HOUSEKEEPING_INTERVAL: Duration = Duration::from_millis(1);

fn read_lock<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poison_error| {
        tracing::warn!(lock = what, "Reading from poisoned lock, using recovered data");
        poison_error.into_inner()
    })
}

fn write_lock<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poison_error| {
        tracing::warn!(lock = what, "Writing to poisoned lock, using recovered data");
        poison_error.into_inner()
    })
}

/// Records measurements of named operations and derives statistics.
///
/// Each operation has its own buffer, pruned on every ingestion of entries
/// older than [`MonitorConfig::retention`] and capped at
/// [`MonitorConfig::max_samples`] (oldest dropped first). No method panics
/// or returns an error; no lock is held across an `.await`.
///
/// # Example
///
/// ```
/// use pulsecheck::monitor::PerformanceMonitor;
///
/// let monitor = PerformanceMonitor::with_defaults();
/// monitor.start_measurement("db.query").with_metadata("table", "users").end(None);
/// monitor.start_measurement("db.query").end_with_error("timeout", None);
///
/// let stats = monitor.get_stats("db.query").expect("two measurements recorded");
/// assert_eq!(stats.count, 2);
/// assert_eq!(stats.error_count, 1);
/// assert!(monitor.get_stats("unknown").is_none());
/// ```
pub struct PerformanceMonitor {
    config: MonitorConfig,
    buffers: RwLock<HashMap<String, VecDeque<Measurement>>>,
    alerts: RwLock<HashMap<String, Vec<AlertRule>>>,
    history: RwLock<VecDeque<AlertEvent>>,
    handler: RwLock<Option<AlertHandler>>,
}

impl std::fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PerformanceMonitor {
    /// Create a monitor with the given configuration.
    #[must_use]
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            buffers: RwLock::new(HashMap::new()),
            alerts: RwLock::new(HashMap::new()),
            history: RwLock::new(VecDeque::new()),
            handler: RwLock::new(None),
        }
    }

    /// Create a monitor with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(MonitorConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Begin timing `operation`.
    pub fn start_measurement(&self, operation: impl Into<String>) -> MeasurementSpan<'_> {
        MeasurementSpan::new(self, operation.into())
    }

    /// Await `future`, recording it as a success or failure of `operation`.
    ///
    /// # Errors
    ///
    /// Returns whatever error `future` produced, unchanged.
    pub async fn measure<T, E, Fut>(&self, operation: impl Into<String>, future: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let span = self.start_measurement(operation);
        let result = future.await;
        match &result {
            Ok(_) => {
                span.end(None);
            }
            Err(err) => {
                span.end_with_error(err, None);
            }
        }
        result
    }

    /// Ingest a finished measurement.
    ///
    /// `duration` is recomputed from the timestamps and `error` is dropped on
    /// successful measurements.
    pub fn record_metrics(&self, mut measurement: Measurement) {
        measurement.duration = measurement
            .end_time
            .saturating_duration_since(measurement.start_time);
        if measurement.success {
            measurement.error = None;
        }

        self.log_threshold(&measurement);

        let now = Instant::now();
        let mut buffers = write_lock(&self.buffers, "buffers");
        let buffer = buffers.entry(measurement.operation.clone()).or_default();
        buffer.push_back(measurement);
        self.prune(buffer, now);
    }

    /// Statistics for `operation`, or `None` if nothing is retained.
    #[must_use]
    pub fn get_stats(&self, operation: &str) -> Option<Stats> {
        let now = Instant::now();
        let buffers = read_lock(&self.buffers, "buffers");
        let buffer = buffers.get(operation)?;
        compute_stats(operation, buffer.iter().filter(|m| self.is_fresh(m, now)))
    }

    /// Statistics for every operation with retained measurements.
    #[must_use]
    pub fn get_all_stats(&self) -> HashMap<String, Stats> {
        let now = Instant::now();
        let buffers = read_lock(&self.buffers, "buffers");
        buffers
            .iter()
            .filter_map(|(operation, buffer)| {
                compute_stats(operation, buffer.iter().filter(|m| self.is_fresh(m, now)))
                    .map(|stats| (operation.clone(), stats))
            })
            .collect()
    }

    /// Clear one operation's measurements, or all of them when `operation`
    /// is `None`. Alert rules are kept.
    pub fn reset_stats(&self, operation: Option<&str>) {
        let mut buffers = write_lock(&self.buffers, "buffers");
        match operation {
            Some(operation) => {
                buffers.remove(operation);
            }
            None => buffers.clear(),
        }
    }

    /// Prune every buffer by retention and drop empty ones.
    ///
    /// Returns the number of measurements removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut buffers = write_lock(&self.buffers, "buffers");
        let mut removed = 0;
        buffers.retain(|_, buffer| {
            let before = buffer.len();
            self.prune(buffer, now);
            removed += before - buffer.len();
            !buffer.is_empty()
        });
        if removed > 0 {
            tracing::debug!(removed, "Pruned expired measurements");
        }
        removed
    }

    /// Run [`Self::cleanup`] every `interval` until the monitor is dropped.
    ///
    /// Intervals shorter than one millisecond, including zero, are raised
    /// to one millisecond.
    pub fn spawn_housekeeping(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let monitor = Arc::downgrade(self);
        let interval = interval.max(MIN_HOUSEKEEPING_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(monitor) = monitor.upgrade() else {
                    break;
                };
                monitor.cleanup();
            }
        })
    }

    /// Register `rule` on `operation`, replacing any rule with the same name.
    pub fn register_alert(&self, operation: impl Into<String>, rule: AlertRule) {
        let mut alerts = write_lock(&self.alerts, "alerts");
        let rules = alerts.entry(operation.into()).or_default();
        rules.retain(|existing| existing.name != rule.name);
        rules.push(rule);
    }

    /// Remove the rule named `name` from `operation`. Returns true if it existed.
    pub fn remove_alert(&self, operation: &str, name: &str) -> bool {
        let mut alerts = write_lock(&self.alerts, "alerts");
        let Some(rules) = alerts.get_mut(operation) else {
            return false;
        };
        let before = rules.len();
        rules.retain(|rule| rule.name != name);
        let removed = rules.len() != before;
        if rules.is_empty() {
            alerts.remove(operation);
        }
        removed
    }

    /// Set the callback invoked for each alert firing.
    pub fn set_alert_handler(&self, handler: impl Fn(&AlertEvent) + Send + Sync + 'static) {
        *write_lock(&self.handler, "handler") = Some(Arc::new(handler));
    }

    /// Evaluate every registered rule against current statistics.
    ///
    /// Each breach is appended to the alert history and passed to the alert
    /// handler. A breach that persists fires again on every call.
    pub fn check_alerts(&self) -> Vec<AlertEvent> {
        let rules: Vec<(String, Vec<AlertRule>)> = read_lock(&self.alerts, "alerts")
            .iter()
            .map(|(operation, rules)| (operation.clone(), rules.clone()))
            .collect();

        let mut fired = Vec::new();
        for (operation, rules) in rules {
            let Some(stats) = self.get_stats(&operation) else {
                continue;
            };
            for rule in &rules {
                if let Some(event) = rule.evaluate(&stats) {
                    tracing::warn!(
                        alert = %event.alert,
                        operation = %event.operation,
                        percentile = ?event.percentile,
                        observed_ms = event.observed_ms,
                        threshold_ms = event.threshold_ms,
                        "Performance alert fired"
                    );
                    fired.push(event);
                }
            }
        }

        if !fired.is_empty() {
            let mut history = write_lock(&self.history, "history");
            for event in &fired {
                if history.len() >= MAX_ALERT_HISTORY {
                    history.pop_front();
                }
                history.push_back(event.clone());
            }
        }

        let handler = read_lock(&self.handler, "handler").clone();
        if let Some(handler) = handler {
            for event in &fired {
                handler(event);
            }
        }

        fired
    }

    /// Past alert firings, oldest first.
    #[must_use]
    pub fn alert_history(&self) -> Vec<AlertEvent> {
        read_lock(&self.history, "history").iter().cloned().collect()
    }

    /// Snapshot of all statistics and recent alerts.
    #[must_use]
    pub fn report(&self) -> PerformanceReport {
        let operations: BTreeMap<String, Stats> = self.get_all_stats().into_iter().collect();
        let total_measurements = operations.values().map(|stats| stats.count).sum();
        let recent_alerts = {
            let history = read_lock(&self.history, "history");
            let skip = history.len().saturating_sub(REPORT_ALERT_LIMIT);
            history.iter().skip(skip).cloned().collect()
        };

        PerformanceReport {
            generated_at: Utc::now(),
            total_measurements,
            operations,
            recent_alerts,
        }
    }

    fn is_fresh(&self, measurement: &Measurement, now: Instant) -> bool {
        now.saturating_duration_since(measurement.end_time) <= self.config.retention
    }

    fn prune(&self, buffer: &mut VecDeque<Measurement>, now: Instant) {
        buffer.retain(|m| self.is_fresh(m, now));
        while buffer.len() > self.config.max_samples.max(1) {
            buffer.pop_front();
        }
    }

    fn log_threshold(&self, measurement: &Measurement) {
        let duration_ms = millis(measurement.duration);
        if measurement.duration >= self.config.error_threshold {
            tracing::error!(
                operation = %measurement.operation,
                duration_ms,
                success = measurement.success,
                error = ?measurement.error,
                threshold_ms = millis(self.config.error_threshold),
                "Operation exceeded error threshold"
            );
        } else if measurement.duration >= self.config.warning_threshold {
            tracing::warn!(
                operation = %measurement.operation,
                duration_ms,
                success = measurement.success,
                error = ?measurement.error,
                threshold_ms = millis(self.config.warning_threshold),
                "Operation exceeded warning threshold"
            );
        } else if self.config.detailed_logging {
            tracing::info!(
                operation = %measurement.operation,
                duration_ms,
                success = measurement.success,
                "Operation completed"
            );
        }
    }
}
