//! Parameter read/write endpoints
//!
//! - `GET /get`: current authoritative record as a flat JSON object
//! - `POST /set`: one `{"<Name>": <number>}` change, routed through the
//!   dispatcher
//! - `GET /api/schema`: the parameter table
//!
//! Every rejection is answered with `{"Err": "<message>"}`; a successful set
//! answers `{"Err": null}`.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use parmsync_common::wire::{encode_record, ErrBody, SetRequest};
use parmsync_common::ParamSpec;
use tracing::{error, info, warn};

use crate::AppState;

fn fail(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(ErrBody::error(msg))).into_response()
}

/// GET /get
///
/// Snapshot is taken under the record lock; encoding happens after release.
pub async fn get_record(State(state): State<AppState>) -> Response {
    let snapshot = state.record().snapshot();

    match encode_record(&snapshot) {
        Ok(bytes) => ([(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(e) => {
            // Only reachable if a value went non-finite
            error!("GET /get failed: {}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /set
///
/// Body must be a JSON object with exactly one key. The dispatcher decides
/// whether the named parameter exists, is settable, and decodes.
pub async fn set_parameter(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match SetRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected set request: {}", e);
            return fail(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    match state.dispatcher.dispatch(&request.name, &request.raw) {
        Ok(()) => {
            info!("Set {} = {}", request.name, request.raw);
            (StatusCode::OK, Json(ErrBody::ok())).into_response()
        }
        Err(e) => {
            let msg = format!("couldn't set new value for {}: {}", request.name, e);
            warn!("{}", msg);
            fail(StatusCode::BAD_REQUEST, msg)
        }
    }
}

/// GET /api/schema
pub async fn get_schema(State(state): State<AppState>) -> Json<Vec<ParamSpec>> {
    Json(state.schema.specs().to_vec())
}
