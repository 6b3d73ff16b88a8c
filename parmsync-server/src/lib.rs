//! parmsync-server library
//!
//! Holds the authoritative parameter record and serves it over HTTP:
//! - `GET /get` returns the whole record
//! - `POST /set` applies one client-requested change through the dispatcher
//! - A [`ticker::Ticker`] task mutates read-only parameters to simulate a
//!   live backend feed

use axum::Router;
use parmsync_common::build_info::BuildInfo;
use parmsync_common::{Dispatcher, ParameterSchema, SharedRecord};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod ticker;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Only write path into the authoritative record
    pub dispatcher: Dispatcher,
    pub schema: Arc<ParameterSchema>,
}

impl AppState {
    /// Create new application state around an existing record
    pub fn new(record: SharedRecord) -> Self {
        let schema = record.schema();
        Self {
            dispatcher: Dispatcher::new(record),
            schema,
        }
    }

    /// Zero-initialised authoritative record for `schema`
    pub fn with_schema(schema: ParameterSchema) -> Self {
        Self::new(SharedRecord::zeroed(Arc::new(schema)))
    }

    pub fn record(&self) -> &SharedRecord {
        self.dispatcher.record()
    }
}

/// Identity of this binary for the banner, `/health` and build info
pub fn build_info() -> BuildInfo {
    BuildInfo::new("parmsync-server", env!("CARGO_PKG_VERSION"))
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/get", get(api::get_record))
        .route("/set", post(api::set_parameter))
        .route("/api/schema", get(api::get_schema))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
