//! Parameter records and the lock-guarded shared record
//!
//! A [`Record`] holds one `f64` per schema entry, in schema order. The server
//! owns one authoritative record and each client owns one replica; they are
//! never shared in memory, only reconciled through the HTTP protocol.
//!
//! [`SharedRecord`] is the only way a record is read or written once the
//! process is running. Both operations take the same mutex, so a reader
//! always sees the result of a complete [`SharedRecord::apply`] call and
//! never a mutation in progress. The lock is held only for the copy or the
//! closure body; callers must not await or do I/O inside `apply`.

use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::params::ParameterSchema;

/// Fixed-shape set of named numeric parameters
#[derive(Clone, PartialEq)]
pub struct Record {
    schema: Arc<ParameterSchema>,
    values: Vec<f64>,
}

impl Record {
    /// Record with every field set to 0.0
    pub fn zeroed(schema: Arc<ParameterSchema>) -> Self {
        let values = vec![0.0; schema.len()];
        Self { schema, values }
    }

    /// Build from values already in schema order
    ///
    /// Returns `None` when the value count does not match the schema width.
    pub fn from_values(schema: Arc<ParameterSchema>, values: Vec<f64>) -> Option<Self> {
        (values.len() == schema.len()).then_some(Self { schema, values })
    }

    pub fn schema(&self) -> &Arc<ParameterSchema> {
        &self.schema
    }

    /// Value of the named field
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|i| self.values[i])
    }

    /// Set the named field, returning false if the name is not in the schema
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        match self.schema.position(name) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    /// Value at a schema position
    ///
    /// # Panics
    /// Panics if `position` is outside the schema.
    pub fn value_at(&self, position: usize) -> f64 {
        self.values[position]
    }

    /// Set the value at a schema position
    ///
    /// # Panics
    /// Panics if `position` is outside the schema.
    pub fn set_at(&mut self, position: usize, value: f64) {
        self.values[position] = value;
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.schema.names().zip(self.values.iter().copied())
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Encodes as a JSON object keyed by parameter name, in schema order
///
/// Non-finite values have no JSON representation and fail the encode rather
/// than being written as `null`.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            if !value.is_finite() {
                return Err(S::Error::custom(format!(
                    "{} has non-finite value {}",
                    name, value
                )));
            }
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Mutex-guarded record shared between request handlers and a background task
///
/// Cloning yields another handle to the same record.
#[derive(Clone)]
pub struct SharedRecord {
    inner: Arc<Mutex<Record>>,
}

impl SharedRecord {
    pub fn new(record: Record) -> Self {
        Self {
            inner: Arc::new(Mutex::new(record)),
        }
    }

    /// Shared record with every field set to 0.0
    pub fn zeroed(schema: Arc<ParameterSchema>) -> Self {
        Self::new(Record::zeroed(schema))
    }

    /// Full copy of the current record
    pub fn snapshot(&self) -> Record {
        self.lock().clone()
    }

    /// Run `mutator` with exclusive access to the live record
    ///
    /// Every change made by the closure becomes visible at once to the next
    /// `snapshot` or `apply`.
    pub fn apply<F, R>(&self, mutator: F) -> R
    where
        F: FnOnce(&mut Record) -> R,
    {
        let mut guard = self.lock();
        mutator(&mut *guard)
    }

    /// Overwrite the whole record
    ///
    /// Values are copied position by position and the stored schema handle
    /// is kept. Returns false, leaving the record untouched, when the
    /// replacement has a different width.
    pub fn replace(&self, record: &Record) -> bool {
        self.apply(|live| {
            if live.values.len() != record.values.len() {
                return false;
            }
            live.values.copy_from_slice(&record.values);
            true
        })
    }

    pub fn schema(&self) -> Arc<ParameterSchema> {
        Arc::clone(self.lock().schema())
    }

    // A mutator that panicked leaves the lock poisoned; the record itself is
    // still a plain vector of floats, so keep serving it.
    fn lock(&self) -> MutexGuard<'_, Record> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SharedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedRecord").field(&self.snapshot()).finish()
    }
}
