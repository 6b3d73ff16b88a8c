//! Common error types for parmsync

use thiserror::Error;

/// Common result type for parmsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by server and client
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parameter schema construction error
    #[error("Schema error: {0}")]
    Schema(String),

    /// Record could not be encoded to or decoded from the wire format
    #[error("Codec error: {0}")]
    Codec(String),
}

/// Rejection of a single named mutation by the [`Dispatcher`](crate::dispatch::Dispatcher)
///
/// The `Display` text is what the server hands back to the caller, so it
/// always names the parameter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// No schema entry has this name
    #[error("unknown parameter {0}")]
    UnknownParameter(String),

    /// The schema entry exists but is read-only
    #[error("{0} is not settable")]
    NotSettable(String),

    /// The raw value could not be decoded into the declared numeric kind
    #[error("couldn't decode value for {name}: {cause}")]
    Decode { name: String, cause: String },
}

/// Rejection of a `{"<Field>": <number>}` request body before dispatch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetRequestError {
    /// Body is not a JSON object
    #[error("{0}")]
    Malformed(String),

    /// Body names zero or several fields
    #[error("only one item per set request, please, found {0}")]
    FieldCount(usize),
}
