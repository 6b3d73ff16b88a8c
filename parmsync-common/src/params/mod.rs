//! Parameter schema
//!
//! The schema is the single source of truth for the shape of a [`Record`]
//! and for the mutation policy enforced by the
//! [`Dispatcher`](crate::dispatch::Dispatcher):
//! - Parameter names (also the JSON wire names, case-sensitive)
//! - Numeric kind of each parameter
//! - Whether a remote client may set it
//!
//! A schema is built once at startup, either from the built-in table
//! (see [`ParameterSchema::default_parameters`]) or from the `[[parameters]]`
//! section of the TOML configuration, and is immutable afterwards. Server
//! and client share it behind an `Arc`.
//!
//! [`Record`]: crate::record::Record

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::{Error, Result};

mod defaults;

/// Decodes one raw JSON scalar into the in-memory value type
///
/// Errors carry the underlying parse error text.
pub type Decoder = fn(&Value) -> std::result::Result<f64, String>;

/// Numeric kind of a parameter
///
/// Only one floating-point kind exists today. New kinds get their own
/// decoder and keep the record storage as `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NumericKind {
    /// 64-bit IEEE 754 float
    #[default]
    Float,
}

impl NumericKind {
    /// Wire/config name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericKind::Float => "float",
        }
    }

    /// Decoder for raw JSON values of this kind
    pub fn decoder(&self) -> Decoder {
        match self {
            NumericKind::Float => decode_float,
        }
    }
}

fn decode_float(raw: &Value) -> std::result::Result<f64, String> {
    f64::deserialize(raw).map_err(|e| e.to_string())
}

/// One schema entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: NumericKind,
    #[serde(default)]
    pub settable: bool,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: NumericKind, settable: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            settable,
        }
    }

    /// Read-only float parameter
    pub fn read_only(name: impl Into<String>) -> Self {
        Self::new(name, NumericKind::Float, false)
    }

    /// Client-settable float parameter
    pub fn settable(name: impl Into<String>) -> Self {
        Self::new(name, NumericKind::Float, true)
    }
}

/// Ordered, immutable list of parameter descriptors
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSchema {
    params: Vec<ParamSpec>,
    index: HashMap<String, usize>,
}

impl ParameterSchema {
    /// Build a schema, rejecting empty tables and empty or duplicate names
    pub fn new(params: Vec<ParamSpec>) -> Result<Self> {
        if params.is_empty() {
            return Err(Error::Schema("schema must define at least one parameter".to_string()));
        }

        let mut index = HashMap::with_capacity(params.len());
        for (position, spec) in params.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(Error::Schema(format!(
                    "parameter #{} has an empty name",
                    position + 1
                )));
            }
            if index.insert(spec.name.clone(), position).is_some() {
                return Err(Error::Schema(format!(
                    "duplicate parameter name {}",
                    spec.name
                )));
            }
        }

        Ok(Self { params, index })
    }

    /// Number of parameters (record width)
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Schema-order position of `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.position(name).map(|i| &self.params[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParamSpec> {
        self.params.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    pub fn specs(&self) -> &[ParamSpec] {
        &self.params
    }
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self::default_parameters()
    }
}

impl<'a> IntoIterator for &'a ParameterSchema {
    type Item = &'a ParamSpec;
    type IntoIter = std::slice::Iter<'a, ParamSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
