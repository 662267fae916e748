//! HTTP server assembly

use crate::config::ServerConfig;
use crate::{DaemonError, Result};
use axum::Router;
use quorum_http::AppState;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Build the application router with tracing, timeout and CORS layers.
pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    let mut app = quorum_http::app(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeout_secs))),
    );

    if config.cors_enabled {
        app = app.layer(CorsLayer::permissive());
    }

    app
}

/// Bind and serve until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = build_app(state, config);

    let listener = TcpListener::bind(config.bind_addr).await.map_err(|e| {
        DaemonError::Http(format!("Failed to bind to {}: {e}", config.bind_addr))
    })?;

    info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DaemonError::Http(format!("HTTP server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Received shutdown signal");
}
