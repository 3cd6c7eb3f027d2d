// Environment configuration.
//
// Values come from the process environment (after `dotenvy::dotenv()`), read
// through a lookup closure so tests can supply their own map.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use axum::http::HeaderValue;

const DEFAULT_ORIGIN: &str = "http://localhost:3000";

#[cfg(windows)]
const DEFAULT_DISK_PATH: &str = "C:\\";
#[cfg(not(windows))]
const DEFAULT_DISK_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq)]
pub enum AllowedOrigins {
    /// `*` — any origin is echoed back (credentials rule out a literal `*`).
    Any,
    List(Vec<HeaderValue>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuSampling {
    /// Block each request for a fresh sample.
    Request,
    /// Serve the latest value from a background task.
    Background,
}

impl CpuSampling {
    pub fn as_str(self) -> &'static str {
        match self {
            CpuSampling::Request => "request",
            CpuSampling::Background => "background",
        }
    }
}

impl FromStr for CpuSampling {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "request" => Ok(CpuSampling::Request),
            "background" => Ok(CpuSampling::Background),
            other => bail!("expected `request` or `background`, got `{}`", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub allowed_origins: AllowedOrigins,
    pub cpu_sample_interval: Duration,
    pub cpu_sampling: CpuSampling,
    pub disk_path: PathBuf,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8000,
            allowed_origins: AllowedOrigins::List(vec![HeaderValue::from_static(DEFAULT_ORIGIN)]),
            cpu_sample_interval: Duration::from_secs(1),
            cpu_sampling: CpuSampling::Request,
            disk_path: PathBuf::from(DEFAULT_DISK_PATH),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = match get("HOST") {
            Some(v) => v.trim().parse::<IpAddr>().with_context(|| format!("HOST: invalid address `{}`", v))?,
            None => defaults.host,
        };
        let port = match get("PORT") {
            Some(v) => v.trim().parse::<u16>().with_context(|| format!("PORT: invalid port `{}`", v))?,
            None => defaults.port,
        };
        let allowed_origins = match get("ALLOWED_ORIGINS") {
            Some(v) => parse_origins(&v).context("ALLOWED_ORIGINS")?,
            None => defaults.allowed_origins,
        };
        let cpu_sample_interval = match get("CPU_SAMPLE_INTERVAL_MS") {
            Some(v) => Duration::from_millis(
                v.trim()
                    .parse::<u64>()
                    .with_context(|| format!("CPU_SAMPLE_INTERVAL_MS: invalid value `{}`", v))?,
            ),
            None => defaults.cpu_sample_interval,
        };
        let cpu_sampling = match get("CPU_SAMPLING") {
            Some(v) => v.parse::<CpuSampling>().context("CPU_SAMPLING")?,
            None => defaults.cpu_sampling,
        };
        let disk_path = get("DISK_PATH").map(PathBuf::from).unwrap_or(defaults.disk_path);
        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.trim()
                    .parse::<u64>()
                    .with_context(|| format!("REQUEST_TIMEOUT_SECS: invalid value `{}`", v))?,
            ),
            None => defaults.request_timeout,
        };

        if cpu_sample_interval.is_zero() {
            bail!("CPU_SAMPLE_INTERVAL_MS must be greater than 0");
        }
        if request_timeout.is_zero() {
            bail!("REQUEST_TIMEOUT_SECS must be greater than 0");
        }
        if cpu_sampling == CpuSampling::Request && request_timeout <= cpu_sample_interval {
            bail!(
                "REQUEST_TIMEOUT_SECS ({}s) must exceed the CPU sampling interval ({}ms)",
                request_timeout.as_secs(),
                cpu_sample_interval.as_millis()
            );
        }

        Ok(Config {
            host,
            port,
            allowed_origins,
            cpu_sample_interval,
            cpu_sampling,
            disk_path,
            request_timeout,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> anyhow::Result<AllowedOrigins> {
    let entries: Vec<&str> = raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    if entries.contains(&"*") {
        return Ok(AllowedOrigins::Any);
    }
    if entries.is_empty() {
        bail!("no origins listed");
    }
    let origins = entries
        .into_iter()
        .map(|o| {
            HeaderValue::from_str(o.trim_end_matches('/'))
                .with_context(|| format!("invalid origin `{}`", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(AllowedOrigins::List(origins))
}
