//! Liveness endpoint

use axum::{Router, routing::get};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health - Returns 200 while the server accepts connections
async fn health() -> &'static str {
    "OK"
}
