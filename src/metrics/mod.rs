// ---------------------------------------------------------------------------
// metrics/ — host metric collection, independent of the HTTP layer
// ---------------------------------------------------------------------------

pub mod sampler;
pub mod sysinfo_source;

pub use sampler::CpuSampler;
pub use sysinfo_source::{CpuMode, SysinfoSource};

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{SystemSnapshot, Usage};

/// Which OS reading failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Hostname,
    Platform,
    BootTime,
    Cpu,
    Memory,
    Disk,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Hostname => "hostname",
            Metric::Platform => "platform",
            Metric::BootTime => "boot_time",
            Metric::Cpu => "cpu",
            Metric::Memory => "memory",
            Metric::Disk => "disk",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    #[error("{metric} unavailable: {reason}")]
    Unavailable { metric: Metric, reason: String },
}

impl MetricsError {
    pub fn unavailable(metric: Metric, reason: impl Into<String>) -> Self {
        MetricsError::Unavailable {
            metric,
            reason: reason.into(),
        }
    }

    pub fn metric(&self) -> Metric {
        match self {
            MetricsError::Unavailable { metric, .. } => *metric,
        }
    }
}

pub type Result<T> = std::result::Result<T, MetricsError>;

/// Capability for reading OS-level metrics.
///
/// Every method is a synchronous OS query. `cpu_percent` may block the
/// calling thread for the sampling interval, so callers on an async runtime
/// must run collection on a blocking thread.
pub trait HostMetricsSource: Send + Sync {
    fn hostname(&self) -> Result<String>;

    fn platform(&self) -> Result<String>;

    /// Boot time as Unix seconds.
    fn boot_time(&self) -> Result<u64>;

    fn cpu_percent(&self) -> Result<f32>;

    fn memory(&self) -> Result<Usage>;

    fn disk(&self) -> Result<Usage>;

    /// `false` while the source cannot yet answer `cpu_percent`.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Read every metric from `source` and assemble a snapshot.
///
/// Fails on the first unavailable reading; a partial snapshot is never built.
pub fn collect_snapshot(source: &dyn HostMetricsSource) -> Result<SystemSnapshot> {
    let hostname = source.hostname()?;
    let os = source.platform()?;
    let uptime = uptime_at(source.boot_time()?, SystemTime::now())?;
    let cpu_usage = source.cpu_percent()?.clamp(0.0, 100.0);
    let ram = source.memory()?;
    let disk = source.disk()?;

    Ok(SystemSnapshot {
        hostname,
        os,
        uptime,
        cpu_usage,
        ram,
        disk,
    })
}

/// Seconds elapsed between `boot_time` (Unix seconds) and `now`, never
/// negative. A clock set before the epoch is a failed reading, not zero uptime.
fn uptime_at(boot_time: u64, now: SystemTime) -> Result<f64> {
    let now = now.duration_since(UNIX_EPOCH).map_err(|e| {
        MetricsError::unavailable(Metric::BootTime, format!("system clock before Unix epoch: {}", e))
    })?;
    Ok((now.as_secs_f64() - boot_time as f64).max(0.0))
}
