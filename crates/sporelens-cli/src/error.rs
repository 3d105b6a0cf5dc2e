//! Error types for sporelens-cli

use thiserror::Error;

/// Result type alias for sporelens-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sporelens-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from sporelens-core
    #[error(transparent)]
    Core(#[from] sporelens_core::Error),

    /// Failure writing command output
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Malformed event stream line
    #[error("Invalid event on line {line}: {message}")]
    Event {
        /// 1-based line number
        line: usize,
        /// Parser message
        message: String,
    },
}
