//! # parmsync common library
//!
//! Shared code for the parmsync server and client:
//! - Parameter schema (names, kinds, settable policy)
//! - Records and the lock-guarded [`SharedRecord`]
//! - Schema-driven [`Dispatcher`] for remote mutations
//! - JSON wire format
//! - Bootstrap configuration
//! - Build identification and health payloads
//! - Error types

pub mod build_info;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod params;
pub mod record;
pub mod wire;

pub use dispatch::Dispatcher;
pub use error::{DispatchError, Error, Result, SetRequestError};
pub use params::{NumericKind, ParamSpec, ParameterSchema};
pub use record::{Record, SharedRecord};
