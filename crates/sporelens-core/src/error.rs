//! Error types for sporelens-core
//!
//! Only the system boundary can fail: reading files, parsing documents or
//! configuration, and validating configuration. The classification,
//! extraction, and search algorithms model every failure as data.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for sporelens operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the Sporelens boundary
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O failure tied to a specific file.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Input that could not be parsed (documents, config, events).
    #[error("Parse error in {context}: {message}")]
    Parse {
        /// What was being parsed
        context: String,
        /// Parser message
        message: String,
    },

    /// Configuration is invalid or cannot be located.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A named item was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of item (e.g., "document")
        kind: String,
        /// Identifier that was looked up
        id: String,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The search service is no longer running.
    #[error("Service error: {0}")]
    Service(String),
}

impl Error {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Creates an I/O error carrying the offending path.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Creates a service error.
    pub fn service(message: impl Into<String>) -> Self {
        Error::Service(message.into())
    }

    /// Creates a not-found error.
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
