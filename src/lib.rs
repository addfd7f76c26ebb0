//! Pulsecheck
//!
//! The resilience and telemetry core behind a service's health endpoint:
//! a retry/timeout executor, a multi-dependency health aggregator, and a
//! percentile-based performance monitor with alerting.
//!
//! # Features
//!
//! - Exponential backoff with signed jitter and per-attempt timeouts
//! - Health checks that never fail: every probe error becomes data
//! - Deterministic healthy/degraded/unhealthy tie-breaking
//! - Nearest-rank p50/p95/p99 over bounded, time-windowed buffers
//! - Threshold logging and percentile alerts through `tracing`
//!
//! # Quick Start
//!
//! ```bash
//! DATASTORE_URL=https://db.example.com/rest/v1/ DATASTORE_API_KEY=anon-key ./pulsecheck
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  probes   ┌────────────────────┐
//! │ HealthAggregator │──────────▶│ ResilienceExecutor │──────▶ dependency
//! └────────┬─────────┘           └────────────────────┘
//!          │ health.<name>, health.check
//!          ▼
//! ┌────────────────────┐
//! │ PerformanceMonitor │──────▶ tracing (thresholds, alerts)
//! └────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod health;
pub mod monitor;
pub mod probes;
pub mod resilience;

mod time;
