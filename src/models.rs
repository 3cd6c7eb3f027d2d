use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// System snapshot
// ---------------------------------------------------------------------------

/// Point-in-time reading of host metrics, built per request and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SystemSnapshot {
    pub hostname: String,
    pub os: String,
    /// Seconds since boot.
    pub uptime: f64,
    /// Global CPU utilization over the sampling interval, 0-100.
    pub cpu_usage: f32,
    pub ram: Usage,
    pub disk: Usage,
}

/// Capacity figures shared by `ram` and `disk`. All sizes in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Usage {
    pub total: u64,
    pub used: u64,
    pub percent: f64,
}

impl Usage {
    /// Build from raw totals. `used` is capped at `total` and the percentage
    /// is rounded to one decimal place; a zero total reports 0 %.
    pub fn new(total: u64, used: u64) -> Self {
        let used = used.min(total);
        Self {
            total,
            used,
            percent: percent_of(used, total),
        }
    }
}

fn percent_of(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = used as f64 / total as f64 * 100.0;
    ((pct * 10.0).round() / 10.0).clamp(0.0, 100.0)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub app: String,
    pub uptime_seconds: u64,
    /// `request` or `background`.
    pub cpu_sampling: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub uptime_seconds: u64,
}
