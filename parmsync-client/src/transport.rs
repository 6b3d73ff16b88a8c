//! HTTP transport to the parmsync server
//!
//! Thin wrapper over `reqwest` for the two server endpoints. Every request
//! carries the configured timeout so a stalled server cannot hold up the
//! sync loop's cadence; a timeout is reported like any other failure.

use parmsync_common::wire::{decode_record, ErrBody, SetRequest};
use parmsync_common::{ParameterSchema, Record};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::edit_slot::PendingEdit;

const USER_AGENT: &str = concat!("parmsync-client/", env!("CARGO_PKG_VERSION"));

/// Client-side transport failures
///
/// None of these are fatal; the sync loop logs them and skips the cycle.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    /// Server answered with a non-200 status
    #[error("server returned {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SyncError::Timeout
        } else if e.is_decode() {
            SyncError::Decode(e.to_string())
        } else {
            SyncError::Network(e.to_string())
        }
    }
}

/// Fetch/push client bound to one server
#[derive(Debug, Clone)]
pub struct ServerTransport {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ServerTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /get and decode a full record for `schema`
    pub async fn fetch(&self, schema: &Arc<ParameterSchema>) -> Result<Record, SyncError> {
        let response = self
            .http
            .get(self.url("/get"))
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(SyncError::Rejected {
                status: status.as_u16(),
                message: error_text(&bytes),
            });
        }

        decode_record(schema, &bytes).map_err(|e| SyncError::Decode(e.to_string()))
    }

    /// POST one pending edit to /set
    pub async fn push(&self, edit: &PendingEdit) -> Result<(), SyncError> {
        let body = SetRequest::new(edit.name.clone(), edit.value.clone()).to_body();

        tracing::debug!("POST /set {}", body);

        let response = self
            .http
            .post(self.url("/set"))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let bytes = response.bytes().await?;
        Err(SyncError::Rejected {
            status: status.as_u16(),
            message: error_text(&bytes),
        })
    }
}

/// Message from an `{"Err": ...}` body, or the raw body text
fn error_text(bytes: &[u8]) -> String {
    match serde_json::from_slice::<ErrBody>(bytes) {
        Ok(ErrBody { err: Some(msg) }) => msg,
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}
