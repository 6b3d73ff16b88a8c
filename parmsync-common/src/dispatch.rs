//! Schema-driven mutation dispatch
//!
//! The [`Dispatcher`] is the only path by which a remote request may change
//! the authoritative record. It owns a lookup table built once from the
//! [`ParameterSchema`], mapping each name to its record position, settable
//! flag and decoder, and applies at most one field per call.
//!
//! # Decision order
//!
//! 1. Unknown name → [`DispatchError::UnknownParameter`]
//! 2. Known but read-only → [`DispatchError::NotSettable`] (value is not
//!    even decoded)
//! 3. Value does not decode as the declared kind → [`DispatchError::Decode`]
//! 4. Otherwise exactly that field is written inside one
//!    [`SharedRecord::apply`]
//!
//! Rejections never touch the record.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::DispatchError;
use crate::params::{Decoder, NumericKind, ParameterSchema};
use crate::record::SharedRecord;

/// Per-name dispatch entry
#[derive(Clone, Copy)]
struct DispatchEntry {
    position: usize,
    kind: NumericKind,
    settable: bool,
    decode: Decoder,
}

/// Validates and applies named single-field mutations to a [`SharedRecord`]
#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<HashMap<String, DispatchEntry>>,
    record: SharedRecord,
}

impl Dispatcher {
    /// Build the dispatch table for the record's schema
    pub fn new(record: SharedRecord) -> Self {
        let schema = record.schema();
        let table = build_table(&schema);
        Self {
            table: Arc::new(table),
            record,
        }
    }

    /// Record this dispatcher writes to
    pub fn record(&self) -> &SharedRecord {
        &self.record
    }

    /// Apply `raw` to the parameter called `name` if the schema allows it
    pub fn dispatch(&self, name: &str, raw: &Value) -> Result<(), DispatchError> {
        let entry = self
            .table
            .get(name)
            .ok_or_else(|| DispatchError::UnknownParameter(name.to_string()))?;

        if !entry.settable {
            return Err(DispatchError::NotSettable(name.to_string()));
        }

        let value = (entry.decode)(raw).map_err(|cause| DispatchError::Decode {
            name: name.to_string(),
            cause,
        })?;

        let position = entry.position;
        self.record.apply(|r| r.set_at(position, value));

        tracing::debug!(
            parameter = name,
            kind = entry.kind.as_str(),
            value,
            "Applied parameter update"
        );
        Ok(())
    }

    /// Whether `name` exists and may be set remotely
    pub fn is_settable(&self, name: &str) -> bool {
        self.table.get(name).is_some_and(|e| e.settable)
    }
}

fn build_table(schema: &ParameterSchema) -> HashMap<String, DispatchEntry> {
    schema
        .iter()
        .enumerate()
        .map(|(position, spec)| {
            (
                spec.name.clone(),
                DispatchEntry {
                    position,
                    kind: spec.kind,
                    settable: spec.settable,
                    decode: spec.kind.decoder(),
                },
            )
        })
        .collect()
}
