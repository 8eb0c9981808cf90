//! Error types for milkrun.
//!
//! A single error type with explicit variants for the local store, the
//! network transport, server responses, and input validation. Storage and
//! input errors are fatal to the operation that raised them; transport and
//! protocol errors leave local state untouched and are retried on the next
//! sync trigger.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The unified error type for milkrun operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The local record store could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Network transport errors (connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered, but not with a usable success response.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true if retrying on a later trigger may succeed without
    /// any change to local state.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Protocol(_))
    }
}

/// Local persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a file failed.
    #[error("I/O error on {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// The store lock could not be acquired or released.
    #[error("lock error on {}: {message}", path.display())]
    Lock { path: PathBuf, message: String },

    /// A persisted file exists but does not decode.
    #[error("corrupt data in {}: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    /// A value could not be encoded for persistence.
    #[error("encode error: {message}")]
    Encode { message: String },
}

impl StorageError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        StorageError::Io {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Wrap a lock failure with the lock file path.
    pub fn lock(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        StorageError::Lock {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Wrap a decode failure with the file it came from.
    pub fn corrupt(path: impl AsRef<Path>, err: serde_json::Error) -> Self {
        StorageError::Corrupt {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A reachable server that did not return a usable success response.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Message from the server, if any.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Check if the server refused the credentials.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Quantity must be a positive, finite number of liters.
    #[error("invalid quantity {value}: must be positive and finite")]
    Quantity { value: f64 },

    /// Balance must be finite.
    #[error("invalid balance {value}: must be finite")]
    Balance { value: f64 },

    /// Invalid server URL.
    #[error("invalid server URL '{value}': {reason}")]
    ServerUrl { value: String, reason: String },

    /// A required field was missing or empty.
    #[error("missing required field '{field}'")]
    Missing { field: &'static str },
}
