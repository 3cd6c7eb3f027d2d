// Background CPU sampler.
//
// Keeps one long-lived `sysinfo::System` and refreshes its CPU counters every
// interval, so `/system` can answer without blocking for a fresh sample.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use sysinfo::System;
use tokio::task::JoinHandle;

/// Latest global CPU percentage published by the sampler task.
///
/// Uses `std::sync::RwLock` because readers run on blocking threads
/// (inside `spawn_blocking`), not inside a tokio poll.
#[derive(Clone, Default)]
pub struct CpuSampler {
    latest: Arc<RwLock<Option<f32>>>,
}

impl CpuSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the first sample is published.
    pub fn latest(&self) -> Option<f32> {
        *self.latest.read().unwrap_or_else(|p| p.into_inner())
    }

    pub(crate) fn publish(&self, cpu: f32) {
        *self.latest.write().unwrap_or_else(|p| p.into_inner()) = Some(cpu.clamp(0.0, 100.0));
    }

    fn clear(&self) {
        *self.latest.write().unwrap_or_else(|p| p.into_inner()) = None;
    }

    /// Spawn the refresh loop on the current tokio runtime.
    ///
    /// The returned handle belongs to a supervisor that logs if the loop ever
    /// exits and drops the stale reading, so readiness falls back to 503.
    pub fn spawn(&self, interval: Duration) -> JoinHandle<()> {
        let worker = self.spawn_worker(interval);
        let sampler = self.clone();
        tokio::spawn(async move { sampler.supervise(worker).await })
    }

    async fn supervise(&self, worker: JoinHandle<()>) {
        match worker.await {
            Ok(()) => tracing::error!("cpu sampler: stopped unexpectedly"),
            Err(e) if e.is_panic() => tracing::error!("cpu sampler: panicked: {}", e),
            Err(e) => tracing::warn!("cpu sampler: cancelled: {}", e),
        }
        self.clear();
    }

    fn spawn_worker(&self, interval: Duration) -> JoinHandle<()> {
        let sampler = self.clone();
        let interval = interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        tokio::spawn(async move {
            tracing::info!("cpu sampler: started (interval={}ms)", interval.as_millis());

            let mut sys = System::new();
            // Baseline for the delta; the first reading needs two refreshes.
            sys.refresh_cpu_usage();
            tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;

            loop {
                // Only CPU counters; a full refresh would reset the baseline.
                sys.refresh_cpu_usage();
                if sys.cpus().is_empty() {
                    tracing::warn!("cpu sampler: no CPUs reported, skipping sample");
                } else {
                    let cpu = sys.global_cpu_usage();
                    tracing::debug!(cpu, "cpu sampler: published sample");
                    sampler.publish(cpu);
                }
                tokio::time::sleep(interval).await;
            }
        })
    }
}
