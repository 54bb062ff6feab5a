//! Sturdy HTTP server
//!
//! Exposes calm script generation and the local journal over JSON.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use state::AppState;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Full application router with middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Sturdy API server
pub async fn start_server(config: ServerConfig) -> ServerResult<()> {
    use std::net::SocketAddr;

    tracing::info!("Starting Sturdy API server on {}", config.bind_address);
    if !sturdy_core::ai_configured(&config.ai) {
        tracing::warn!("AI provider not configured; every script will be the default");
    }

    let state = AppState::new(&config);
    let app = router(state);

    let addr: SocketAddr = config.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
