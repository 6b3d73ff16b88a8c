//! Best-effort sync status indicator
//!
//! Transport failures are never surfaced to the UI as hard errors; they only
//! show up here as counters, a `connected` flag and the last error text.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::transport::SyncError;

/// Point-in-time copy of the sync counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncStatusSnapshot {
    /// Whether the most recent fetch succeeded
    pub connected: bool,
    pub fetches_ok: u64,
    pub fetches_failed: u64,
    pub pushes_ok: u64,
    pub pushes_failed: u64,
    pub last_error: Option<String>,
    /// Time of the last successful fetch
    pub last_sync: Option<DateTime<Utc>>,
}

/// Shared, lock-guarded sync status
#[derive(Debug, Default)]
pub struct SyncStatus {
    inner: Mutex<SyncStatusSnapshot>,
}

impl SyncStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SyncStatusSnapshot {
        self.lock().clone()
    }

    pub fn record_fetch(&self, result: &Result<(), SyncError>) {
        let mut status = self.lock();
        match result {
            Ok(()) => {
                status.connected = true;
                status.fetches_ok += 1;
                status.last_sync = Some(Utc::now());
            }
            Err(e) => {
                status.connected = false;
                status.fetches_failed += 1;
                status.last_error = Some(format!("fetch: {}", e));
            }
        }
    }

    pub fn record_push(&self, result: &Result<(), SyncError>) {
        let mut status = self.lock();
        match result {
            Ok(()) => status.pushes_ok += 1,
            Err(e) => {
                status.pushes_failed += 1;
                status.last_error = Some(format!("push: {}", e));
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SyncStatusSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
