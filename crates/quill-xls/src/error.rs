//! XLS error types

use thiserror::Error;

/// Result type for XLS operations
pub type XlsResult<T> = std::result::Result<T, XlsError>;

/// Errors that can occur while writing the binary workbook format
#[derive(Debug, Error)]
pub enum XlsError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Container error
    #[error("Container error: {0}")]
    Container(#[from] quill_ole::OleError),
}
