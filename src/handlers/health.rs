// ---------------------------------------------------------------------------
// handlers/health.rs — liveness and readiness
// ---------------------------------------------------------------------------

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::models::{HealthResponse, ReadinessResponse};
use crate::state::AppState;

#[utoipa::path(get, path = "/api/health", tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        app: "sysmon".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        cpu_sampling: state.cpu_sampling.as_str().to_string(),
    })
}

/// GET /api/health/ready — 503 until the metrics source can serve a snapshot.
#[utoipa::path(get, path = "/api/health/ready", tag = "health",
    responses(
        (status = 200, description = "Service ready", body = ReadinessResponse),
        (status = 503, description = "Service not ready", body = ReadinessResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> axum::response::Response {
    let ready = state.is_ready();
    let body = ReadinessResponse {
        ready,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    };

    if ready {
        (StatusCode::OK, Json(body)).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
    }
}
