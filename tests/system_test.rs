// GET /system integration tests over a fixture metrics source.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use futures_util::future::join_all;
use serde_json::Value;
use tower::ServiceExt;

use common::{FixtureSource, GIB, app_with, body_json, get, state_with};
use sysmon_backend::config::Config;
use sysmon_backend::metrics::Metric;

fn assert_snapshot_invariants(json: &Value) {
    let cpu = json["cpu_usage"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&cpu), "cpu_usage out of range: {}", cpu);
    assert!(json["uptime"].as_f64().unwrap() >= 0.0);

    for key in ["ram", "disk"] {
        let total = json[key]["total"].as_u64().unwrap();
        let used = json[key]["used"].as_u64().unwrap();
        let percent = json[key]["percent"].as_f64().unwrap();
        assert!(used <= total, "{}: used {} > total {}", key, used, total);
        assert!((0.0..=100.0).contains(&percent), "{}: percent {}", key, percent);
    }
}

fn keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
}

// ═══════════════════════════════════════════════════════════════════════════
//  Happy path
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn system_returns_200_with_snapshot() {
    let app = app_with(FixtureSource::healthy(), &Config::default());
    let response = app.oneshot(get("/system")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["hostname"], "fixture-host");
    assert_eq!(json["os"], "Linux-6.1.0-x86_64");
    assert_eq!(json["ram"]["total"], 16 * GIB);
    assert_eq!(json["ram"]["used"], 8 * GIB);
    assert_eq!(json["ram"]["percent"], 50.0);
    assert_eq!(json["disk"]["percent"], 25.0);
    assert!(json["uptime"].as_f64().unwrap() > 0.0);
    assert_snapshot_invariants(&json);
}

#[tokio::test]
async fn system_shape_is_stable_across_calls() {
    let app = app_with(FixtureSource::healthy(), &Config::default());

    let first = body_json(app.clone().oneshot(get("/system")).await.unwrap()).await;
    let second = body_json(app.oneshot(get("/system")).await.unwrap()).await;

    assert_eq!(keys(&first), ["cpu_usage", "disk", "hostname", "os", "ram", "uptime"]);
    assert_eq!(keys(&first), keys(&second));
    assert_eq!(keys(&first["ram"]), ["percent", "total", "used"]);
    assert_eq!(keys(&first["disk"]), ["percent", "total", "used"]);
    assert_eq!(keys(&second["ram"]), keys(&first["ram"]));
}

#[tokio::test]
async fn every_request_takes_a_fresh_cpu_sample() {
    let source = Arc::new(FixtureSource::healthy());
    let config = Config::default();
    let app = sysmon_backend::create_router(state_with(source.clone(), &config));

    for _ in 0..3 {
        let response = app.clone().oneshot(get("/system")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(source.cpu_samples.load(Ordering::SeqCst), 3);
}

// ═══════════════════════════════════════════════════════════════════════════
//  Failures
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn disk_failure_returns_500_not_partial_snapshot() {
    let app = app_with(FixtureSource::failing(Metric::Disk), &Config::default());
    let response = app.oneshot(get("/system")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json.get("hostname").is_none());
    assert!(json.get("ram").is_none());
    assert_eq!(json["error"]["code"], "METRICS_UNAVAILABLE");
    assert_eq!(json["error"]["details"]["metric"], "disk");
    assert!(json["error"]["message"].as_str().unwrap().contains("disk"));
}

#[tokio::test]
async fn every_metric_failure_is_a_server_error() {
    for metric in [
        Metric::Hostname,
        Metric::Platform,
        Metric::BootTime,
        Metric::Cpu,
        Metric::Memory,
        Metric::Disk,
    ] {
        let app = app_with(FixtureSource::failing(metric), &Config::default());
        let response = app.oneshot(get("/system")).await.unwrap();
        assert!(response.status().is_server_error(), "{} failure", metric);
        let json = body_json(response).await;
        assert_eq!(json["error"]["details"]["metric"], metric.as_str());
    }
}

#[tokio::test]
async fn slow_collection_times_out_with_504() {
    let config = Config {
        request_timeout: Duration::from_millis(100),
        ..Config::default()
    };
    let app = app_with(FixtureSource::slow(Duration::from_millis(600)), &config);
    let response = app.oneshot(get("/system")).await.unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "TIMEOUT");
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concurrency
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_sample_independently() {
    const N: usize = 8;
    let delay = Duration::from_millis(300);
    let source = Arc::new(FixtureSource::slow(delay));
    let config = Config::default();
    let app = sysmon_backend::create_router(state_with(source.clone(), &config));

    let started = Instant::now();
    let responses = join_all((0..N).map(|_| app.clone().oneshot(get("/system")))).await;
    let elapsed = started.elapsed();

    let mut cpu_values = Vec::new();
    for response in responses {
        let response = response.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_snapshot_invariants(&json);
        assert_eq!(json["hostname"], "fixture-host");
        assert_eq!(json["ram"]["percent"], 50.0);
        assert_eq!(json["disk"]["percent"], 25.0);
        cpu_values.push(json["cpu_usage"].as_f64().unwrap() as u64);
    }

    // One sample per request, each request got its own.
    assert_eq!(source.cpu_samples.load(Ordering::SeqCst), N);
    cpu_values.sort();
    cpu_values.dedup();
    assert_eq!(cpu_values.len(), N);

    // Samples overlap rather than queue behind each other.
    assert!(elapsed < delay * N as u32, "requests were serialized: {:?}", elapsed);
}
