//! Performance monitor workflows.
//!
//! Exercises the monitor through its public API the way a request handler
//! would: spans around work, periodic alert checks, and a final report.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use pulsecheck::monitor::{
    AlertEvent, AlertRule, Measurement, MonitorConfig, Percentile, PerformanceMonitor,
};

fn record(monitor: &PerformanceMonitor, operation: &str, ms: u64) {
    monitor.record_metrics(Measurement::ending_now(
        operation,
        Duration::from_millis(ms),
        true,
    ));
}

#[test]
fn test_reset_isolates_operations() {
    let monitor = PerformanceMonitor::with_defaults();
    for ms in [5, 10, 15] {
        record(&monitor, "x", ms);
        record(&monitor, "y", ms * 2);
    }
    let y_before = monitor.get_stats("y").unwrap();

    monitor.reset_stats(Some("x"));

    assert!(monitor.get_stats("x").is_none());
    let y_after = monitor.get_stats("y").unwrap();
    assert_eq!(y_after.count, y_before.count);
    assert_eq!(y_after.p95_ms, y_before.p95_ms);

    monitor.reset_stats(None);
    assert!(monitor.get_all_stats().is_empty());
}

#[test]
fn test_eviction_respects_max_samples() {
    let monitor = PerformanceMonitor::new(MonitorConfig {
        max_samples: 25,
        ..MonitorConfig::default()
    });
    for ms in 0..100 {
        record(&monitor, "db.query", ms);
    }

    let stats = monitor.get_stats("db.query").unwrap();
    assert_eq!(stats.count, 25);
    // Oldest dropped first: only 75..100 remain
    assert_eq!(stats.min_duration_ms, 75.0);
}

#[test]
fn test_percentile_ordering_holds_for_skewed_data() {
    let monitor = PerformanceMonitor::with_defaults();
    for ms in [1, 1, 1, 1, 1, 1, 1, 1, 1, 500] {
        record(&monitor, "skewed", ms);
    }

    let stats = monitor.get_stats("skewed").unwrap();
    assert!(stats.min_duration_ms <= stats.p50_ms);
    assert!(stats.p50_ms <= stats.p95_ms);
    assert!(stats.p95_ms <= stats.p99_ms);
    assert!(stats.p99_ms <= stats.max_duration_ms);
    assert_eq!(stats.p50_ms, 1.0);
    assert_eq!(stats.p99_ms, 500.0);
}

#[test]
fn test_sustained_breach_fires_on_every_check() {
    let monitor = PerformanceMonitor::with_defaults();
    let seen: Arc<Mutex<Vec<AlertEvent>>> = Arc::default();
    let sink = Arc::clone(&seen);
    monitor.set_alert_handler(move |event| sink.lock().unwrap().push(event.clone()));
    monitor.register_alert(
        "checkout",
        AlertRule::new("checkout-p99", Duration::from_millis(200), Percentile::P99)
            .with_min_measurements(5),
    );

    for _ in 0..5 {
        record(&monitor, "checkout", 450);
    }
    for _ in 0..3 {
        monitor.check_alerts();
    }

    let events = seen.lock().unwrap();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.observed_ms == 450.0));
    assert_eq!(monitor.alert_history().len(), 3);
}

#[tokio::test]
async fn test_report_after_spans() {
    let monitor = Arc::new(PerformanceMonitor::with_defaults());

    monitor
        .start_measurement("api.login")
        .with_metadata("provider", "github")
        .end(None);
    monitor
        .start_measurement("api.login")
        .end_with_error("invalid grant", None);
    let _: Result<(), String> = monitor
        .measure("api.logout", async { Ok(()) })
        .await;

    let report = monitor.report();
    assert_eq!(report.total_measurements, 3);
    assert_eq!(report.operations["api.login"].error_count, 1);
    assert_eq!(report.operations["api.logout"].success_rate(), 1.0);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["generated_at"].is_string());
}

#[tokio::test(start_paused = true)]
async fn test_housekeeping_drops_expired_buffers() {
    let monitor = Arc::new(PerformanceMonitor::new(MonitorConfig {
        retention: Duration::from_secs(60),
        ..MonitorConfig::default()
    }));
    record(&monitor, "stale", 1);

    let handle = monitor.spawn_housekeeping(Duration::from_secs(30));
    tokio::time::sleep(Duration::from_secs(100)).await;

    assert!(monitor.get_all_stats().is_empty());
    assert_eq!(monitor.cleanup(), 0);
    handle.abort();
}
