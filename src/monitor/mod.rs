//! Performance monitoring.
//!
//! This module provides:
//! - Per-operation measurement buffers bounded by age and sample count
//! - Nearest-rank p50/p95/p99 statistics computed on demand
//! - Threshold logging of slow operations through `tracing`
//! - Named percentile alerts with a bounded firing history
//! - Periodic retention housekeeping
//!
//! The monitor is an explicitly constructed value; share it with
//! `Arc<PerformanceMonitor>`.
//!
//! # Example
//!
//! ```
//! use pulsecheck::monitor::{AlertRule, Percentile, PerformanceMonitor};
//! use std::time::Duration;
//!
//! let monitor = PerformanceMonitor::with_defaults();
//! monitor.register_alert(
//!     "db.query",
//!     AlertRule::new("db-p95", Duration::from_millis(250), Percentile::P95),
//! );
//!
//! monitor.start_measurement("db.query").end(None);
//!
//! // Fewer than the rule's minimum sample count: nothing fires
//! assert!(monitor.check_alerts().is_empty());
//! assert_eq!(monitor.report().total_measurements, 1);
//! ```

mod alerts;
mod collector;
mod percentile;
mod span;
mod types;

pub use alerts::{
    AlertEvent, AlertHandler, AlertRule, Percentile, DEFAULT_MIN_MEASUREMENTS, MAX_ALERT_HISTORY,
};
pub use collector::PerformanceMonitor;
pub use percentile::nearest_rank;
pub use span::MeasurementSpan;
pub use types::{
    Measurement, Metadata, MonitorConfig, PerformanceReport, Stats, DEFAULT_ERROR_THRESHOLD_MS,
    DEFAULT_MAX_SAMPLES, DEFAULT_RETENTION_SECS, DEFAULT_WARNING_THRESHOLD_MS,
};
