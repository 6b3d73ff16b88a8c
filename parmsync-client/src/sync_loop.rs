//! Client-side replication loop
//!
//! # States
//!
//! - **Idle**: wait for whichever comes first of a queued edit, the sync
//!   interval, or cancellation
//! - **Syncing**: push the queued edit (if any) to `/set`, then fetch `/get`
//!   regardless of the push outcome and overwrite the replica wholesale
//!
//! A failed push or fetch is logged and counted in [`SyncStatus`]; the
//! replica keeps its previous value and the loop returns to Idle. Nothing
//! here ends the loop except the cancellation token, which is checked while
//! idle and while a cycle is in flight.

use parmsync_common::{ParameterSchema, Record, SharedRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::edit_slot::EditSlot;
use crate::status::SyncStatus;
use crate::transport::{ServerTransport, SyncError};

/// What a single Syncing pass did
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    /// Push result, `None` when no edit was queued
    pub pushed: Option<Result<(), SyncError>>,
    pub fetched: Result<(), SyncError>,
}

/// Keeps one replica record in step with the server
pub struct SyncLoop {
    transport: ServerTransport,
    replica: SharedRecord,
    schema: Arc<ParameterSchema>,
    edits: EditSlot,
    status: Arc<SyncStatus>,
    interval: Duration,
}

impl SyncLoop {
    pub fn new(
        transport: ServerTransport,
        replica: SharedRecord,
        edits: EditSlot,
        status: Arc<SyncStatus>,
        interval: Duration,
    ) -> Self {
        let schema = replica.schema();
        Self {
            transport,
            replica,
            schema,
            edits,
            status,
            interval,
        }
    }

    /// One Syncing pass: drain and push the pending edit, then fetch
    pub async fn run_cycle(&self) -> CycleOutcome {
        let pushed = match self.edits.take() {
            Some(edit) => {
                let result = self.transport.push(&edit).await;
                match &result {
                    Ok(()) => info!("Pushed {} = {}", edit.name, edit.value),
                    Err(e) => warn!("Push of {} failed: {}", edit.name, e),
                }
                self.status.record_push(&result);
                Some(result)
            }
            None => None,
        };

        let fetched = self.fetch_into_replica().await;
        if let Err(e) = &fetched {
            warn!("Fetch failed, keeping previous replica: {}", e);
        }
        self.status.record_fetch(&fetched);

        CycleOutcome { pushed, fetched }
    }

    async fn fetch_into_replica(&self) -> Result<(), SyncError> {
        let record = self.transport.fetch(&self.schema).await?;
        if !self.replica.replace(&record) {
            return Err(SyncError::Decode(
                "fetched record does not match replica width".to_string(),
            ));
        }
        debug!("Replica: {}", readout(&record));
        Ok(())
    }

    /// Cycle until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            "Sync loop started: server {}, interval {:?}",
            self.transport.base_url(),
            self.interval
        );

        loop {
            // Idle
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.edits.wait_pending() => debug!("Edit queued, syncing early"),
                _ = tokio::time::sleep(self.interval) => {}
            }

            // Syncing
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.run_cycle() => {}
            }
        }

        info!("Sync loop stopped");
    }

    /// Run on the tokio runtime
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}

/// `Name=value` pairs with two decimals, in schema order
pub fn readout(record: &Record) -> String {
    record
        .iter()
        .map(|(name, value)| format!("{}={:.2}", name, value))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use parmsync_common::ParamSpec;

    #[test]
    fn test_readout_format() {
        let schema = Arc::new(
            ParameterSchema::new(vec![
                ParamSpec::read_only("Alpha"),
                ParamSpec::settable("Gamma"),
            ])
            .unwrap(),
        );
        let record = Record::from_values(schema, vec![1.0, 5.555]).unwrap();
        assert_eq!(readout(&record), "Alpha=1.00 Gamma=5.55");
    }
}
