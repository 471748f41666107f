//! Container error types

use thiserror::Error;

/// Result type for container operations
pub type OleResult<T> = std::result::Result<T, OleError>;

/// Errors that can occur while assembling or writing a compound container
#[derive(Debug, Error)]
pub enum OleError {
    /// IO error while committing the container to a sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Declared stream bytes exceed the legacy single-container limit
    #[error("container size {requested} bytes exceeds the {limit} byte limit")]
    Oversize { requested: u64, limit: u64 },

    /// Layout needs more depot sectors than the header can list
    #[error("container needs {needed} depot sectors, more than the {limit} the header holds")]
    DepotOverflow { needed: u32, limit: u32 },

    /// Entry name failed validation
    #[error("invalid entry name: {0}")]
    InvalidName(String),

    /// Entry name already registered under the root
    #[error("duplicate entry name: {0}")]
    DuplicateName(String),
}
