//! Error types for drivebatch.
//!
//! All errors in the system are represented by the [`Error`] enum.
//! This ensures composable error handling across crates.

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type for all drivebatch operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Local file system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Local file not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Remote item not found
    #[error("Not found: {id}")]
    NotFound { id: String },

    /// Invalid argument supplied by the caller
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Parse error
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Remote service rejected or failed the request
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Operation was cancelled before it completed
    #[error("Operation cancelled: {reason}")]
    Cancelled { reason: String },

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an IO error
    pub fn io(err: io::Error) -> Self {
        Error::Io(err)
    }

    /// Create a local file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create a remote not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Error::NotFound { id: id.into() }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a remote service error
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Error::Remote {
            status,
            message: message.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Error::Cancelled {
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Only rate limiting (429) and server-side failures (5xx) qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Remote { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}
