//! Dependency health aggregation.
//!
//! This module provides:
//! - [`DependencyProbe`]: the connectivity check each dependency implements
//! - [`HealthAggregator`]: runs probes under a timeout and reduces the results
//! - [`HealthStatus`] and [`ServiceHealth`]: the report consumers serialize
//!
//! Probe failures never escape as errors. Each one becomes a `down`
//! [`ServiceHealth`] whose `error` is either the probe's message,
//! `"Connection check failed"`, `"Timeout after {n}ms"`, or
//! `"Unknown error"`.

mod aggregator;
mod probe;
mod types;

pub use aggregator::{HealthAggregator, HEALTH_CHECK_OPERATION};
pub use probe::DependencyProbe;
pub use types::{
    HealthConfig, HealthStatus, OverallStatus, ServiceHealth, ServiceStatus,
    CONNECTION_CHECK_FAILED, DEFAULT_PROBE_TIMEOUT_MS,
};
