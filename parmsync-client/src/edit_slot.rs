//! Single-slot pending-edit queue
//!
//! Hand-off between the UI side (request handlers) and the sync loop.
//!
//! Policy: **latest edit wins**. [`EditSlot::submit`] never blocks; if an
//! edit is already waiting it is overwritten and handed back to the caller so
//! the drop can be logged. The sync loop drains the slot with
//! [`EditSlot::take`] at the start of each cycle and uses
//! [`EditSlot::wait_pending`] to wake early when an edit arrives.

use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// A named raw value waiting to be sent to the server's `/set`
///
/// The value stays raw JSON: decoding and settability are the server's call.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    pub name: String,
    pub value: Value,
}

impl PendingEdit {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn float(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, Value::from(value))
    }
}

#[derive(Default)]
struct SlotInner {
    slot: Mutex<Option<PendingEdit>>,
    notify: Notify,
}

/// Latest-wins single-slot queue; clones share the slot
#[derive(Clone, Default)]
pub struct EditSlot {
    inner: Arc<SlotInner>,
}

impl EditSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `edit`, returning the edit it displaced, if any
    pub fn submit(&self, edit: PendingEdit) -> Option<PendingEdit> {
        let displaced = self.lock().replace(edit);
        self.inner.notify.notify_one();
        displaced
    }

    /// Remove and return the waiting edit
    pub fn take(&self) -> Option<PendingEdit> {
        self.lock().take()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_some()
    }

    /// Resolve once an edit is waiting
    ///
    /// Cancel-safe: dropping the future loses nothing, the edit stays in the
    /// slot.
    pub async fn wait_pending(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a submit in between is not missed
            notified.as_mut().enable();

            if self.is_pending() {
                return;
            }
            notified.await;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<PendingEdit>> {
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EditSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSlot")
            .field("pending", &*self.lock())
            .finish()
    }
}
