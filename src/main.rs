use sysmon_backend::config::{AllowedOrigins, Config};
use sysmon_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let config = Config::from_env()?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .init();
    }

    let origins = match &config.allowed_origins {
        AllowedOrigins::Any => "*".to_string(),
        AllowedOrigins::List(list) => list
            .iter()
            .filter_map(|o| o.to_str().ok())
            .collect::<Vec<_>>()
            .join(","),
    };
    tracing::info!(
        cpu_sampling = config.cpu_sampling.as_str(),
        cpu_sample_interval_ms = config.cpu_sample_interval.as_millis() as u64,
        disk_path = %config.disk_path.display(),
        request_timeout_s = config.request_timeout.as_secs(),
        allowed_origins = %origins,
        "config loaded"
    );

    // ── Background CPU sampler (background mode only) ──
    let (state, _sampler) = AppState::from_config(&config);
    let app = sysmon_backend::build_app(state, &config);

    let addr = config.bind_addr();
    tracing::info!("sysmon backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {}", e);
                ctrl_c.await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
