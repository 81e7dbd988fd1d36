use std::net::SocketAddr;
use std::process::ExitCode;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use devkit_gateway::{AppState, Config, build_router, metrics, utils};

#[tokio::main]
async fn main() -> ExitCode {
    // Configuration decides the log filter, so it is loaded first
    let config = match Config::from_env() {
        Ok(config) => {
            init_tracing(&config.log_level);
            config
        }
        Err(e) => {
            init_tracing("info");
            error!("Configuration error: {e}");
            return ExitCode::from(exitcode::CONFIG as u8);
        }
    };

    info!(
        "Starting Dev Agent Kit API v{}",
        env!("CARGO_PKG_VERSION")
    );

    match run(config).await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

/// Run the application, returning an exit code on error.
async fn run(config: Config) -> Result<(), exitcode::ExitCode> {
    info!(
        host = %config.host,
        port = %config.port,
        debug = config.debug,
        credentials = config.has_credentials(),
        "Configuration loaded"
    );

    if let Some(metrics_addr) = config.metrics_addr() {
        metrics::try_init_metrics(metrics_addr);
    }

    let addr: SocketAddr = config.server_addr().parse().map_err(|e| {
        error!("Invalid server address: {e}");
        exitcode::CONFIG
    })?;

    let state = AppState::new(config);
    let app = build_router(state.clone());

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to {addr}: {e}");
        exitcode::UNAVAILABLE
    })?;

    info!("Server listening on http://{addr}");
    info!("API endpoints:");
    info!("  GET  /                    - Service description");
    info!("  GET  /health              - Health check");
    info!("  POST /api/todos           - Create to-do item");
    info!("  GET  /api/todos           - List to-do items");
    info!("  GET  /api/todos/{{id}}      - Get to-do item");
    info!("  POST /api/seo/analyze     - SEO analysis");
    info!("  POST /api/ai-seo/analyze  - AI SEO analysis");
    info!("  POST /api/geo/analyze     - GEO analysis");
    info!("  GET  /api/stream          - Event stream (SSE)");
    info!("  GET  /docs, /redoc        - API documentation");

    axum::serve(listener, app)
        .with_graceful_shutdown(utils::shutdown_signal(state.shutdown_token()))
        .await
        .map_err(|e| {
            error!("Server error: {e}");
            exitcode::SOFTWARE
        })?;

    info!("HTTP server stopped, shutting down background tasks...");
    state.shutdown().await;

    info!("Server shutdown complete");
    Ok(())
}
