//! Integration tests for pulsecheck.
//!
//! These tests verify end-to-end behavior including:
//! - Health checks against closure and HTTP probes
//! - Retry and timeout scenarios under a paused clock
//! - Performance monitor workflows
//! - Configuration loading into component settings

mod config_env;
mod health_pipeline;
mod monitor_workflow;
mod retry_scenarios;
