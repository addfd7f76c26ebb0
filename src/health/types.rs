//! Health check data model.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default per-probe timeout in milliseconds.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Message for a probe that settled without confirming connectivity.
pub const CONNECTION_CHECK_FAILED: &str = "Connection check failed";

/// Settings for [`super::HealthAggregator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthConfig {
    /// When false, no probe runs and the service list is empty.
    pub dependency_checks_enabled: bool,
    /// Upper bound on each probe's wait.
    pub probe_timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            dependency_checks_enabled: true,
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
        }
    }
}

/// Up/down classification of one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// The probe confirmed connectivity.
    Up,
    /// The probe failed, timed out, or reported no connectivity.
    Down,
}

/// One dependency's probe result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Dependency name.
    pub name: String,
    /// Classification.
    pub status: ServiceStatus,
    /// Elapsed probe time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Failure description, present only when down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    /// A dependency that answered.
    #[must_use]
    pub fn up(name: impl Into<String>, response_time_ms: u64) -> Self {
        Self {
            name: name.into(),
            status: ServiceStatus::Up,
            response_time_ms: Some(response_time_ms),
            error: None,
        }
    }

    /// A dependency that did not answer.
    #[must_use]
    pub fn down(name: impl Into<String>, response_time_ms: u64, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ServiceStatus::Down,
            response_time_ms: Some(response_time_ms),
            error: Some(error.into()),
        }
    }

    /// Returns true if the dependency is up.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.status == ServiceStatus::Up
    }
}

/// System-wide status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    /// Every dependency is up, or none is configured.
    Healthy,
    /// At least one dependency is up and at least one is down.
    Degraded,
    /// Every configured dependency is down.
    Unhealthy,
}

impl OverallStatus {
    /// Reduce per-dependency results to one status.
    ///
    /// | services | result |
    /// |---|---|
    /// | empty | healthy |
    /// | all up | healthy |
    /// | all down | unhealthy |
    /// | mixed | degraded |
    ///
    /// Depends only on the up/down counts, never on order or latency.
    #[must_use]
    pub fn from_services(services: &[ServiceHealth]) -> Self {
        let up = services.iter().filter(|service| service.is_up()).count();
        match (up, services.len() - up) {
            (_, 0) => Self::Healthy,
            (0, _) => Self::Unhealthy,
            _ => Self::Degraded,
        }
    }

    /// Returns true if the system can still serve requests.
    #[must_use]
    pub const fn is_available(self) -> bool {
        !matches!(self, Self::Unhealthy)
    }

    /// Lowercase name, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate result of one health check run.
///
/// `status` is always [`OverallStatus::from_services`] of `services`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Overall classification.
    pub status: OverallStatus,
    /// When the check ran.
    pub timestamp: DateTime<Utc>,
    /// Per-dependency results, in registration order.
    pub services: Vec<ServiceHealth>,
}

impl HealthStatus {
    /// Assemble a status from probe results, deriving the overall status.
    #[must_use]
    pub fn from_services(timestamp: DateTime<Utc>, services: Vec<ServiceHealth>) -> Self {
        Self {
            status: OverallStatus::from_services(&services),
            timestamp,
            services,
        }
    }
}
