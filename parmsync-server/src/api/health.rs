//! Health check endpoint

use axum::{routing::get, Json, Router};
use parmsync_common::build_info::HealthResponse;

use crate::AppState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(crate::build_info().health())
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
