// Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use serde_json::Value;

use sysmon_backend::config::Config;
use sysmon_backend::metrics::{HostMetricsSource, Metric, MetricsError, Result};
use sysmon_backend::models::Usage;
use sysmon_backend::state::AppState;

pub const GIB: u64 = 1024 * 1024 * 1024;

/// Deterministic `HostMetricsSource`: 16 GiB RAM half used, 500 GiB disk a
/// quarter used. `cpu_delay` stands in for the blocking CPU sample.
pub struct FixtureSource {
    pub fail: Option<Metric>,
    pub cpu_delay: Duration,
    pub ready: bool,
    pub cpu_samples: AtomicUsize,
}

impl FixtureSource {
    pub fn healthy() -> Self {
        Self {
            fail: None,
            cpu_delay: Duration::ZERO,
            ready: true,
            cpu_samples: AtomicUsize::new(0),
        }
    }

    pub fn failing(metric: Metric) -> Self {
        Self {
            fail: Some(metric),
            ..Self::healthy()
        }
    }

    pub fn slow(cpu_delay: Duration) -> Self {
        Self {
            cpu_delay,
            ..Self::healthy()
        }
    }

    fn check(&self, metric: Metric) -> Result<()> {
        match self.fail {
            Some(m) if m == metric => Err(MetricsError::unavailable(metric, "simulated failure")),
            _ => Ok(()),
        }
    }
}

impl HostMetricsSource for FixtureSource {
    fn hostname(&self) -> Result<String> {
        self.check(Metric::Hostname)?;
        Ok("fixture-host".to_string())
    }

    fn platform(&self) -> Result<String> {
        self.check(Metric::Platform)?;
        Ok("Linux-6.1.0-x86_64".to_string())
    }

    fn boot_time(&self) -> Result<u64> {
        self.check(Metric::BootTime)?;
        Ok(1_700_000_000)
    }

    fn cpu_percent(&self) -> Result<f32> {
        self.check(Metric::Cpu)?;
        if !self.cpu_delay.is_zero() {
            std::thread::sleep(self.cpu_delay);
        }
        let n = self.cpu_samples.fetch_add(1, Ordering::SeqCst);
        Ok((n % 100) as f32)
    }

    fn memory(&self) -> Result<Usage> {
        self.check(Metric::Memory)?;
        Ok(Usage::new(16 * GIB, 8 * GIB))
    }

    fn disk(&self) -> Result<Usage> {
        self.check(Metric::Disk)?;
        Ok(Usage::new(500 * GIB, 125 * GIB))
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

pub fn state_with(source: Arc<FixtureSource>, config: &Config) -> AppState {
    AppState::new(source, config)
}

/// Full app (CORS and middleware included) over a fixture source.
pub fn app_with(source: FixtureSource, config: &Config) -> axum::Router {
    sysmon_backend::build_app(state_with(Arc::new(source), config), config)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Collect a response body into a `serde_json::Value`.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
