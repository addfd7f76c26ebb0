//! Monitor data model.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::alerts::AlertEvent;

/// Caller-supplied context attached to a measurement. Never interpreted.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Default retention window in seconds (1 hour).
pub const DEFAULT_RETENTION_SECS: u64 = 3_600;
/// Default per-operation sample cap.
pub const DEFAULT_MAX_SAMPLES: usize = 1_000;
/// Default warning threshold in milliseconds.
pub const DEFAULT_WARNING_THRESHOLD_MS: u64 = 1_000;
/// Default error threshold in milliseconds.
pub const DEFAULT_ERROR_THRESHOLD_MS: u64 = 5_000;

/// Settings for [`super::PerformanceMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Measurements older than this are pruned.
    pub retention: Duration,
    /// Maximum retained measurements per operation; oldest go first.
    pub max_samples: usize,
    /// Durations at or above this log at warning severity.
    pub warning_threshold: Duration,
    /// Durations at or above this log at error severity.
    pub error_threshold: Duration,
    /// Log sub-threshold measurements at info severity.
    pub detailed_logging: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(DEFAULT_RETENTION_SECS),
            max_samples: DEFAULT_MAX_SAMPLES,
            warning_threshold: Duration::from_millis(DEFAULT_WARNING_THRESHOLD_MS),
            error_threshold: Duration::from_millis(DEFAULT_ERROR_THRESHOLD_MS),
            detailed_logging: false,
        }
    }
}

/// One recorded execution of a named operation.
///
/// Timestamps come from the monotonic clock; `duration` is always
/// `end_time - start_time` once ingested.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Grouping key for statistics.
    pub operation: String,
    /// When the operation started.
    pub start_time: Instant,
    /// When the operation finished.
    pub end_time: Instant,
    /// Elapsed time.
    pub duration: Duration,
    /// Outcome.
    pub success: bool,
    /// Failure description; only present when `success` is false.
    pub error: Option<String>,
    /// Caller-supplied context.
    pub metadata: Option<Metadata>,
}

impl Measurement {
    /// A successful measurement spanning `start_time..end_time`.
    #[must_use]
    pub fn success(operation: impl Into<String>, start_time: Instant, end_time: Instant) -> Self {
        Self {
            operation: operation.into(),
            start_time,
            end_time,
            duration: end_time.saturating_duration_since(start_time),
            success: true,
            error: None,
            metadata: None,
        }
    }

    /// A failed measurement spanning `start_time..end_time`.
    #[must_use]
    pub fn failure(
        operation: impl Into<String>,
        start_time: Instant,
        end_time: Instant,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::success(operation, start_time, end_time)
        }
    }

    /// A measurement of `duration` that finished just now.
    #[must_use]
    pub fn ending_now(operation: impl Into<String>, duration: Duration, success: bool) -> Self {
        let end_time = Instant::now();
        let start_time = end_time.checked_sub(duration).unwrap_or(end_time);
        let mut measurement = Self::success(operation, start_time, end_time);
        measurement.duration = duration;
        measurement.success = success;
        measurement
    }

    /// Attach metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Duration in fractional milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_nanos() as f64 / 1_000_000.0
    }
}

/// Statistics derived from one operation's retained measurements.
///
/// Only produced when at least one measurement exists, so
/// `min <= p50 <= p95 <= p99 <= max` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Operation name.
    pub operation: String,
    /// Number of retained measurements.
    pub count: usize,
    /// Successful measurements.
    pub success_count: usize,
    /// Failed measurements.
    pub error_count: usize,
    /// Mean duration in milliseconds.
    pub avg_duration_ms: f64,
    /// Shortest duration in milliseconds.
    pub min_duration_ms: f64,
    /// Longest duration in milliseconds.
    pub max_duration_ms: f64,
    /// Median duration in milliseconds.
    pub p50_ms: f64,
    /// 95th percentile duration in milliseconds.
    pub p95_ms: f64,
    /// 99th percentile duration in milliseconds.
    pub p99_ms: f64,
    /// When these statistics were computed.
    pub last_updated: DateTime<Utc>,
}

impl Stats {
    /// Fraction of successful measurements (0.0-1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.success_count as f64 / self.count as f64
    }
}

/// Snapshot of every operation's statistics, for API consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Retained measurements across all operations.
    pub total_measurements: usize,
    /// Per-operation statistics, ordered by name.
    pub operations: BTreeMap<String, Stats>,
    /// Most recent alert firings, oldest first.
    pub recent_alerts: Vec<AlertEvent>,
}
