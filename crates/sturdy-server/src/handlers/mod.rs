//! HTTP request handlers

use axum::{
    routing::{get, post},
    Router,
};

pub mod guidance;
pub mod health;
pub mod journal;
pub mod scripts;

use crate::state::AppState;

/// Build all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/guidance", get(guidance::get_guidance))
        .route("/scripts", post(scripts::generate))
        .route("/journal", get(journal::list))
        .route("/journal/:id", get(journal::get).delete(journal::delete))
}
