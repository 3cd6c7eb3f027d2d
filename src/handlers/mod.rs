// ---------------------------------------------------------------------------
// handlers/ — HTTP surface
// Sub-modules are pub(crate) so utoipa __path_* types are reachable from the
// OpenApi derive in lib.rs.
// ---------------------------------------------------------------------------

pub(crate) mod health;
pub(crate) mod system;

pub use health::{health, readiness};
pub use system::system_info;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::metrics::MetricsError;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for all handlers.
/// Logs full details server-side, returns structured JSON to the client:
///
/// ```json
/// {
///   "error": {
///     "code": "METRICS_UNAVAILABLE",
///     "message": "disk unavailable: no filesystem mounted at /data",
///     "request_id": "uuid",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    MetricsUnavailable(#[from] MetricsError),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::MetricsUnavailable(_) => "METRICS_UNAVAILABLE",
            ApiError::Timeout(_) => "TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MetricsUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to clients. Metric failures name the reading
    /// that failed; internal errors stay generic.
    fn client_message(&self) -> String {
        match self {
            ApiError::MetricsUnavailable(e) => e.to_string(),
            ApiError::Timeout(m) => m.clone(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::MetricsUnavailable(e) => Some(json!({ "metric": e.metric().as_str() })),
            _ => None,
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let request_id = Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            code = self.error_code(),
            "API error ({}): {}",
            status.as_u16(),
            self
        );

        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.client_message(),
                "request_id": request_id,
                "details": self.details(),
            }
        });
        (status, Json(body)).into_response()
    }
}
