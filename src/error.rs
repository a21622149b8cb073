//! Error types for tablekv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TableError
pub type Result<T> = std::result::Result<T, TableError>;

/// Unified error type for tablekv operations
///
/// A missing key is never an error: lookups return `Option`.
#[derive(Debug, Error)]
pub enum TableError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Table too large: offset {0} does not fit in 32 bits")]
    TableTooLarge(u64),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TableError {
    /// Map an I/O error raised while decoding bytes at `offset`.
    ///
    /// Running off the end of the handle means the length fields lie,
    /// which is a corruption rather than a storage failure.
    pub(crate) fn from_read(err: std::io::Error, what: &str, offset: u64) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            TableError::CorruptRecord(format!("short read of {} at offset {}", what, offset))
        } else {
            TableError::Io(err)
        }
    }

    /// True for corruption errors (as opposed to storage failures).
    pub fn is_corruption(&self) -> bool {
        matches!(self, TableError::CorruptRecord(_))
    }
}
