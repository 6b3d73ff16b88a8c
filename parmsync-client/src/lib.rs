//! parmsync-client library
//!
//! Keeps a local replica of the server's parameter record:
//! - [`sync_loop::SyncLoop`] pushes queued edits to `/set` and refreshes the
//!   replica from `/get`
//! - [`edit_slot::EditSlot`] carries at most one pending edit from the local
//!   UI to the loop
//! - A small local HTTP API exposes the replica and accepts edits

use axum::Router;
use parmsync_common::build_info::BuildInfo;
use parmsync_common::{ParameterSchema, SharedRecord};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod edit_slot;
pub mod status;
pub mod sync_loop;
pub mod transport;

use edit_slot::EditSlot;
use status::SyncStatus;

/// State shared between the local API handlers and the sync loop
#[derive(Clone)]
pub struct AppState {
    /// Last record fetched from the server; only the sync loop writes it
    pub replica: SharedRecord,
    pub edits: EditSlot,
    pub status: Arc<SyncStatus>,
}

impl AppState {
    pub fn new(schema: ParameterSchema) -> Self {
        Self {
            replica: SharedRecord::zeroed(Arc::new(schema)),
            edits: EditSlot::new(),
            status: Arc::new(SyncStatus::new()),
        }
    }
}

/// Identity of this binary for the banner, `/health` and build info
pub fn build_info() -> BuildInfo {
    BuildInfo::new("parmsync-client", env!("CARGO_PKG_VERSION"))
}

/// Build the local UI router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/replica", get(api::get_replica))
        .route("/edit", post(api::submit_edit))
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
