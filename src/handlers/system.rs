// ---------------------------------------------------------------------------
// handlers/system.rs — GET /system
// ---------------------------------------------------------------------------

use axum::extract::State;
use axum::Json;

use crate::metrics::collect_snapshot;
use crate::models::SystemSnapshot;
use crate::state::AppState;

use super::ApiError;

/// Collect a fresh snapshot of host metrics.
///
/// Collection blocks for the CPU sampling interval, so it runs on the
/// blocking pool, bounded by the configured request timeout.
#[utoipa::path(get, path = "/system", tag = "system",
    responses(
        (status = 200, description = "Current host metrics", body = SystemSnapshot),
        (status = 500, description = "A metric could not be read from the OS"),
        (status = 504, description = "Collection exceeded the request timeout")
    )
)]
pub async fn system_info(State(state): State<AppState>) -> Result<Json<SystemSnapshot>, ApiError> {
    let source = state.source.clone();
    let task = tokio::task::spawn_blocking(move || collect_snapshot(source.as_ref()));

    match tokio::time::timeout(state.request_timeout, task).await {
        Ok(Ok(result)) => Ok(Json(result?)),
        Ok(Err(e)) => Err(ApiError::Internal(format!("metrics task failed: {}", e))),
        Err(_) => Err(ApiError::Timeout(format!(
            "metrics collection exceeded {}ms",
            state.request_timeout.as_millis()
        ))),
    }
}
