pub mod config;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod state;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowCredentials, AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::{AllowedOrigins, Config};
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(title = "sysmon", description = "Host system metrics for the local dashboard"),
    paths(
        handlers::system::system_info,
        handlers::health::health,
        handlers::health::readiness,
    ),
    components(schemas(
        models::SystemSnapshot,
        models::Usage,
        models::HealthResponse,
        models::ReadinessResponse,
    )),
    tags(
        (name = "system", description = "Host metrics"),
        (name = "health", description = "Liveness and readiness probes"),
    )
)]
pub struct ApiDoc;

/// Build the bare application router with the given state.
/// Integration tests use this with a fixture metrics source.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/system", get(handlers::system_info))
        .route("/api/health", get(handlers::health))
        .route("/api/health/ready", get(handlers::readiness))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

/// Router plus CORS, security headers, request tracing and compression.
pub fn build_app(state: AppState, config: &Config) -> Router {
    let nosniff: SetResponseHeaderLayer<HeaderValue> = SetResponseHeaderLayer::overriding(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    let frame_deny: SetResponseHeaderLayer<HeaderValue> = SetResponseHeaderLayer::overriding(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static("DENY"),
    );

    create_router(state)
        .layer(cors_layer(&config.allowed_origins))
        .layer(nosniff)
        .layer(frame_deny)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CompressionLayer::new())
}

/// Credentialed CORS for the dashboard: every method and header is allowed,
/// origins are restricted to `origins`.
///
/// With credentials a literal `*` is not allowed, so methods and headers are
/// mirrored from the request, and `AllowedOrigins::Any` mirrors the origin.
/// Origins outside the list get neither allow-origin nor allow-credentials.
pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let (allow_origin, allow_credentials) = match origins {
        AllowedOrigins::Any => (AllowOrigin::mirror_request(), AllowCredentials::yes()),
        AllowedOrigins::List(list) => {
            let allowed = list.clone();
            (
                AllowOrigin::list(list.iter().cloned()),
                AllowCredentials::predicate(move |origin: &HeaderValue, _| allowed.contains(origin)),
            )
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(allow_credentials)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .max_age(std::time::Duration::from_secs(600))
}
