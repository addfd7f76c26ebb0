//! In-flight measurement handle.

use std::fmt::Display;
use std::time::Duration;

use tokio::time::Instant;

use super::collector::PerformanceMonitor;
use super::types::{Measurement, Metadata};

/// Times one execution of an operation.
///
/// Finish with [`MeasurementSpan::end`] or [`MeasurementSpan::end_with_error`];
/// both consume the span. A span dropped without either records nothing.
#[must_use = "a span records nothing unless `end` or `end_with_error` is called"]
#[derive(Debug)]
pub struct MeasurementSpan<'a> {
    monitor: &'a PerformanceMonitor,
    operation: String,
    start: Instant,
    metadata: Metadata,
}

impl<'a> MeasurementSpan<'a> {
    pub(super) fn new(monitor: &'a PerformanceMonitor, operation: String) -> Self {
        Self {
            monitor,
            operation,
            start: Instant::now(),
            metadata: Metadata::new(),
        }
    }

    /// Operation being timed.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Time since the span started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Attach a metadata entry.
    pub fn add_metadata(
        &mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> &mut Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach a metadata entry, by value.
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.add_metadata(key, value);
        self
    }

    /// Record a successful measurement. Returns the measured duration.
    #[allow(clippy::must_use_candidate)]
    pub fn end(self, extra: Option<Metadata>) -> Duration {
        self.finish(None, extra)
    }

    /// Record a failed measurement. Returns the measured duration.
    #[allow(clippy::must_use_candidate)]
    pub fn end_with_error(self, error: impl Display, extra: Option<Metadata>) -> Duration {
        self.finish(Some(error.to_string()), extra)
    }

    fn finish(self, error: Option<String>, extra: Option<Metadata>) -> Duration {
        let end = Instant::now();
        let mut metadata = self.metadata;
        metadata.extend(extra.unwrap_or_default());

        let mut measurement = match error {
            None => Measurement::success(self.operation, self.start, end),
            Some(error) => Measurement::failure(self.operation, self.start, end, error),
        };
        if !metadata.is_empty() {
            measurement.metadata = Some(metadata);
        }

        let duration = measurement.duration;
        self.monitor.record_metrics(measurement);
        duration
    }
}
