// Application state shared with every handler.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use crate::config::{Config, CpuSampling};
use crate::metrics::{CpuMode, CpuSampler, HostMetricsSource, SysinfoSource};

#[derive(Clone)]
pub struct AppState {
    /// Where `/system` reads its metrics from.
    pub source: Arc<dyn HostMetricsSource>,
    pub start_time: Instant,
    /// Upper bound on one snapshot collection, including the CPU sample.
    pub request_timeout: Duration,
    pub cpu_sampling: CpuSampling,
}

impl AppState {
    pub fn new(source: Arc<dyn HostMetricsSource>, config: &Config) -> Self {
        Self {
            source,
            start_time: Instant::now(),
            request_timeout: config.request_timeout,
            cpu_sampling: config.cpu_sampling,
        }
    }

    /// Build the production state backed by `sysinfo`.
    ///
    /// In background mode this spawns the CPU sampler and returns its
    /// supervisor handle, so it must be called from inside a tokio runtime.
    pub fn from_config(config: &Config) -> (Self, Option<JoinHandle<()>>) {
        let (cpu, sampler_task) = match config.cpu_sampling {
            CpuSampling::Request => (CpuMode::PerRequest(config.cpu_sample_interval), None),
            CpuSampling::Background => {
                let sampler = CpuSampler::new();
                let task = sampler.spawn(config.cpu_sample_interval);
                (CpuMode::Background(sampler), Some(task))
            }
        };
        let source = SysinfoSource::new(cpu, config.disk_path.clone());
        (Self::new(Arc::new(source), config), sampler_task)
    }

    pub fn is_ready(&self) -> bool {
        self.source.is_ready()
    }
}
