//! Build information endpoint

use axum::Json;
use parmsync_common::build_info::BuildInfo;

/// GET /api/buildinfo
pub async fn get_build_info() -> Json<BuildInfo> {
    Json(crate::build_info())
}
