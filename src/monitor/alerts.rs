//! Threshold alerts evaluated against operation statistics.
//!
//! Alerts are stateless checks: every call to
//! [`super::PerformanceMonitor::check_alerts`] re-evaluates every rule, so a
//! breach that persists fires on every poll. There is no debouncing beyond
//! `min_measurements`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::Stats;
use crate::error::ConfigError;

/// Number of alert firings kept in history.
pub const MAX_ALERT_HISTORY: usize = 100;

/// Default sample floor before an alert may fire.
pub const DEFAULT_MIN_MEASUREMENTS: usize = 10;

/// Callback invoked for each alert firing.
pub type AlertHandler = Arc<dyn Fn(&AlertEvent) + Send + Sync>;

/// Percentile an alert watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Percentile {
    /// Median.
    P50,
    /// 95th percentile.
    P95,
    /// 99th percentile.
    P99,
}

impl Percentile {
    /// Read this percentile from `stats`, in milliseconds.
    #[must_use]
    pub const fn of(self, stats: &Stats) -> f64 {
        match self {
            Self::P50 => stats.p50_ms,
            Self::P95 => stats.p95_ms,
            Self::P99 => stats.p99_ms,
        }
    }
}

impl TryFrom<u8> for Percentile {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            50 => Ok(Self::P50),
            95 => Ok(Self::P95),
            99 => Ok(Self::P99),
            other => Err(ConfigError::InvalidValue {
                var: "percentile".into(),
                reason: format!("{other} is not one of 50, 95, 99"),
            }),
        }
    }
}

/// A named latency alert on one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRule {
    /// Alert name, unique per operation.
    pub name: String,
    /// Fires when the percentile is strictly above this.
    pub threshold: Duration,
    /// Which percentile to compare.
    pub percentile: Percentile,
    /// Samples required before the alert may fire.
    pub min_measurements: usize,
}

impl AlertRule {
    /// Create a rule with the default sample floor.
    #[must_use]
    pub fn new(name: impl Into<String>, threshold: Duration, percentile: Percentile) -> Self {
        Self {
            name: name.into(),
            threshold,
            percentile,
            min_measurements: DEFAULT_MIN_MEASUREMENTS,
        }
    }

    /// Set the sample floor.
    #[must_use]
    pub const fn with_min_measurements(mut self, min_measurements: usize) -> Self {
        self.min_measurements = min_measurements;
        self
    }

    /// Threshold in fractional milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn threshold_ms(&self) -> f64 {
        self.threshold.as_nanos() as f64 / 1_000_000.0
    }

    /// Evaluate against `stats`, producing an event if the rule is breached.
    #[must_use]
    pub fn evaluate(&self, stats: &Stats) -> Option<AlertEvent> {
        if stats.count < self.min_measurements {
            return None;
        }
        let observed_ms = self.percentile.of(stats);
        (observed_ms > self.threshold_ms()).then(|| AlertEvent {
            alert: self.name.clone(),
            operation: stats.operation.clone(),
            percentile: self.percentile,
            threshold_ms: self.threshold_ms(),
            observed_ms,
            sample_count: stats.count,
            fired_at: Utc::now(),
        })
    }
}

/// One alert firing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Name of the rule that fired.
    pub alert: String,
    /// Operation the rule watches.
    pub operation: String,
    /// Percentile compared.
    pub percentile: Percentile,
    /// Configured threshold in milliseconds.
    pub threshold_ms: f64,
    /// Observed percentile value in milliseconds.
    pub observed_ms: f64,
    /// Samples behind the observation.
    pub sample_count: usize,
    /// When the alert fired.
    pub fired_at: DateTime<Utc>,
}
