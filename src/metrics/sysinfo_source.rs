// Production `HostMetricsSource` backed by the `sysinfo` crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sysinfo::{Disks, System};

use super::{CpuSampler, HostMetricsSource, Metric, MetricsError, Result};
use crate::models::Usage;

/// How `cpu_percent` obtains its reading.
#[derive(Clone)]
pub enum CpuMode {
    /// Block the calling thread for the interval and sample fresh counters.
    PerRequest(Duration),
    /// Read the value last published by a background sampler.
    Background(CpuSampler),
}

pub struct SysinfoSource {
    cpu: CpuMode,
    disk_path: PathBuf,
}

impl SysinfoSource {
    pub fn new(cpu: CpuMode, disk_path: impl Into<PathBuf>) -> Self {
        Self {
            cpu,
            disk_path: disk_path.into(),
        }
    }

    pub fn disk_path(&self) -> &Path {
        &self.disk_path
    }
}

impl HostMetricsSource for SysinfoSource {
    fn hostname(&self) -> Result<String> {
        System::host_name()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| MetricsError::unavailable(Metric::Hostname, "host name not reported"))
    }

    fn platform(&self) -> Result<String> {
        let kernel = System::kernel_version().ok_or_else(|| {
            MetricsError::unavailable(Metric::Platform, "kernel version not reported")
        })?;
        Ok(format!(
            "{}-{}-{}",
            system_label(std::env::consts::OS),
            kernel,
            std::env::consts::ARCH
        ))
    }

    fn boot_time(&self) -> Result<u64> {
        match System::boot_time() {
            0 => Err(MetricsError::unavailable(Metric::BootTime, "boot time not reported")),
            t => Ok(t),
        }
    }

    fn cpu_percent(&self) -> Result<f32> {
        match &self.cpu {
            CpuMode::PerRequest(interval) => sample_cpu_blocking(*interval),
            CpuMode::Background(sampler) => sampler.latest().ok_or_else(|| {
                MetricsError::unavailable(Metric::Cpu, "background sampler has no reading yet")
            }),
        }
    }

    fn memory(&self) -> Result<Usage> {
        let mut sys = System::new();
        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            return Err(MetricsError::unavailable(Metric::Memory, "total memory reported as 0"));
        }
        Ok(Usage::new(total, sys.used_memory()))
    }

    fn disk(&self) -> Result<Usage> {
        let disks = Disks::new_with_refreshed_list();
        let mounts = disks
            .list()
            .iter()
            .map(|d| (d.mount_point(), d.total_space(), d.available_space()));
        let (total, available) = select_mount(mounts, &self.disk_path).ok_or_else(|| {
            MetricsError::unavailable(
                Metric::Disk,
                format!("no filesystem mounted at {}", self.disk_path.display()),
            )
        })?;
        if total == 0 {
            return Err(MetricsError::unavailable(
                Metric::Disk,
                format!("filesystem at {} reports zero capacity", self.disk_path.display()),
            ));
        }
        Ok(Usage::new(total, total.saturating_sub(available)))
    }

    fn is_ready(&self) -> bool {
        match &self.cpu {
            CpuMode::PerRequest(_) => true,
            CpuMode::Background(sampler) => sampler.latest().is_some(),
        }
    }
}

/// Two refreshes separated by `interval`; sysinfo computes usage from the delta.
fn sample_cpu_blocking(interval: Duration) -> Result<f32> {
    let mut sys = System::new();
    sys.refresh_cpu_usage();
    std::thread::sleep(interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
    sys.refresh_cpu_usage();
    if sys.cpus().is_empty() {
        return Err(MetricsError::unavailable(Metric::Cpu, "no CPUs reported"));
    }
    Ok(sys.global_cpu_usage())
}

fn system_label(os: &str) -> &str {
    match os {
        "linux" => "Linux",
        "macos" => "macOS",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

/// Pick the mount whose mount point is the longest ancestor of `path`.
/// Returns `(total, available)` in bytes.
fn select_mount<'a>(
    mounts: impl Iterator<Item = (&'a Path, u64, u64)>,
    path: &Path,
) -> Option<(u64, u64)> {
    mounts
        .filter(|(mount, _, _)| path.starts_with(mount))
        .max_by_key(|(mount, _, _)| mount.components().count())
        .map(|(_, total, available)| (total, available))
}
