//! Archive storage error types
//!
//! Defines all errors that can occur while reading the weather archive.

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Archive database is missing or cannot be opened
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// SQL preparation or execution failed
    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// No archive column or daily summary table exists for this observation type
    #[error("Unknown observation type: {0}")]
    UnknownObservationType(String),

    /// Caller supplied an argument the archive cannot answer
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid time span (start > end)
    #[error("Invalid time span: start must not be after end")]
    InvalidTimeSpan,
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::UnknownObservationType("outTemp".to_string());
        assert_eq!(err.to_string(), "Unknown observation type: outTemp");

        let err = StorageError::InvalidTimeSpan;
        assert_eq!(
            err.to_string(),
            "Invalid time span: start must not be after end"
        );
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let sql_err = rusqlite::Error::QueryReturnedNoRows;
        let storage_err: StorageError = sql_err.into();
        assert!(matches!(storage_err, StorageError::Query(_)));
    }
}
