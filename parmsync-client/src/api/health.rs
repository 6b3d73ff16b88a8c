//! Health check endpoint

use axum::{routing::get, Json, Router};
use parmsync_common::build_info::HealthResponse;

use crate::AppState;

/// GET /health
///
/// Reports the process as up even while the server is unreachable; see
/// `/replica` for sync status.
pub async fn health_check() -> Json<HealthResponse> {
    Json(crate::build_info().health())
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
