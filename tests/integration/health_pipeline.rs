//! Health check pipeline tests.
//!
//! Drives the aggregator end to end with closure probes and a datastore
//! probe pointed at a mock HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use pulsecheck::config::{Config, SecretString};
use pulsecheck::error::ProbeFailure;
use pulsecheck::health::{
    HealthAggregator, HealthConfig, OverallStatus, ServiceStatus, HEALTH_CHECK_OPERATION,
};
use pulsecheck::monitor::PerformanceMonitor;
use pulsecheck::probes::{FnProbe, HttpProbe, DATASTORE_PROBE_NAME};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn monitor() -> Arc<PerformanceMonitor> {
    Arc::new(PerformanceMonitor::with_defaults())
}

#[tokio::test]
async fn test_disabled_checks_skip_probe_entirely() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let probe = FnProbe::new("datastore", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok(Some(true)) }
    });

    let config = HealthConfig {
        dependency_checks_enabled: false,
        ..HealthConfig::default()
    };
    let aggregator = HealthAggregator::new(config, monitor()).with_probe(Arc::new(probe));

    let status = aggregator.perform_health_check().await;

    assert_eq!(status.status, OverallStatus::Healthy);
    assert!(status.services.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_plain_string_failure_is_not_leaked() {
    let probe = FnProbe::new("datastore", || async {
        Err(ProbeFailure::Text("password=hunter2".into()))
    });
    let aggregator =
        HealthAggregator::new(HealthConfig::default(), monitor()).with_probe(Arc::new(probe));

    let status = aggregator.perform_health_check().await;

    let service = &status.services[0];
    assert_eq!(service.status, ServiceStatus::Down);
    assert_eq!(service.error.as_deref(), Some("Unknown error"));
    let json = serde_json::to_string(&status).unwrap();
    assert!(!json.contains("hunter2"));
}

#[tokio::test(start_paused = true)]
async fn test_slow_probe_times_out_and_is_measured() {
    let monitor = monitor();
    let probe = FnProbe::new("datastore", || async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Some(true))
    });
    let config = HealthConfig {
        dependency_checks_enabled: true,
        probe_timeout: Duration::from_millis(250),
    };
    let aggregator =
        HealthAggregator::new(config, Arc::clone(&monitor)).with_probe(Arc::new(probe));

    let status = aggregator.perform_health_check().await;

    assert_eq!(status.status, OverallStatus::Unhealthy);
    let error = status.services[0].error.as_deref().unwrap();
    assert!(error.contains("250"), "error should name the timeout: {error}");

    let stats = monitor.get_stats("health.datastore").unwrap();
    assert_eq!(stats.error_count, 1);
    assert_eq!(monitor.get_stats(HEALTH_CHECK_OPERATION).unwrap().count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_probes_run_concurrently() {
    let slow = |name: &'static str| {
        FnProbe::new(name, || async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(Some(true))
        })
    };
    let aggregator = HealthAggregator::new(HealthConfig::default(), monitor())
        .with_probe(Arc::new(slow("a")))
        .with_probe(Arc::new(slow("b")))
        .with_probe(Arc::new(slow("c")));

    let start = tokio::time::Instant::now();
    let status = aggregator.perform_health_check().await;

    assert_eq!(status.status, OverallStatus::Healthy);
    assert!(start.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn test_datastore_probe_up_and_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/"))
        .and(header("apikey", "anon-key"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let up_config = Config {
        datastore_url: Some(format!("{}/rest/v1/", server.uri())),
        datastore_api_key: Some(SecretString::new("anon-key")),
        ..Config::default()
    };
    let down_config = Config {
        datastore_url: Some(format!("{}/missing", server.uri())),
        ..up_config.clone()
    };

    let up_probe = HttpProbe::from_config(&up_config).unwrap().unwrap();
    let down_probe = HttpProbe::new(
        "replica",
        down_config.datastore_url.clone().unwrap(),
        None,
        Duration::from_secs(5),
    )
    .unwrap();

    let aggregator = HealthAggregator::new(up_config.health_config(), monitor())
        .with_probe(Arc::new(up_probe))
        .with_probe(Arc::new(down_probe));

    let status = aggregator.perform_health_check().await;

    assert_eq!(status.status, OverallStatus::Degraded);
    assert_eq!(status.services[0].name, DATASTORE_PROBE_NAME);
    assert_eq!(status.services[0].status, ServiceStatus::Up);
    assert_eq!(status.services[1].name, "replica");
    assert_eq!(
        status.services[1].error.as_deref(),
        Some("Connection check failed")
    );
}

#[tokio::test]
async fn test_unreachable_datastore_is_unhealthy() {
    let probe = HttpProbe::new("datastore", "http://127.0.0.1:9/", None, Duration::from_secs(2))
        .unwrap();
    let aggregator =
        HealthAggregator::new(HealthConfig::default(), monitor()).with_probe(Arc::new(probe));

    let status = aggregator.perform_health_check().await;

    assert_eq!(status.status, OverallStatus::Unhealthy);
    assert!(!status.status.is_available());
    let error = status.services[0].error.as_deref().unwrap();
    assert_ne!(error, "Unknown error");
}
