//! Replica readout and edit submission
//!
//! Edits are not validated here; settability and value decoding are decided
//! by the server when the sync loop pushes them.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parmsync_common::wire::{ErrBody, SetRequest};
use parmsync_common::Record;
use serde::Serialize;
use tracing::{info, warn};

use crate::edit_slot::PendingEdit;
use crate::status::SyncStatusSnapshot;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ReplicaResponse {
    pub record: Record,
    pub status: SyncStatusSnapshot,
}

/// Reply to an accepted edit
#[derive(Debug, Serialize)]
pub struct EditAccepted {
    #[serde(rename = "Err")]
    pub err: Option<String>,
    /// Whether a not-yet-pushed edit was discarded
    pub replaced: bool,
}

/// GET /replica
///
/// Returns 500 if the replica cannot be encoded, which only happens with
/// non-finite values.
pub async fn get_replica(State(state): State<AppState>) -> Response {
    let record = state.replica.snapshot();
    let body = ReplicaResponse {
        record,
        status: state.status.snapshot(),
    };

    match serde_json::to_value(&body) {
        Ok(value) => Json(value).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrBody::error(e.to_string())),
        )
            .into_response(),
    }
}

/// POST /edit
///
/// Queues a `{"<Name>": <value>}` edit for the next sync cycle, replacing
/// any edit still waiting.
pub async fn submit_edit(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match SetRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected edit: {}", e);
            return (StatusCode::BAD_REQUEST, Json(ErrBody::error(e.to_string()))).into_response();
        }
    };

    let edit = PendingEdit::new(request.name, request.raw);
    info!("Queued edit {} = {}", edit.name, edit.value);

    let displaced = state.edits.submit(edit);
    if let Some(old) = &displaced {
        info!("Dropped unsent edit {} = {}", old.name, old.value);
    }

    (
        StatusCode::ACCEPTED,
        Json(EditAccepted {
            err: None,
            replaced: displaced.is_some(),
        }),
    )
        .into_response()
}
