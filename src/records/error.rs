//! Record query error types
//!
//! "No data" is not an error: record lookups that match zero rows return
//! `Ok(None)`.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur while resolving a record
#[derive(Error, Debug)]
pub enum RecordError {
    /// Bad month name, unknown aggregate kind, out-of-range day or year
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No daily summary table exists for this observation type
    #[error("Unknown observation type: {0}")]
    UnknownObservationType(String),

    /// Archive unavailable or query failure
    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for RecordError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnknownObservationType(obs) => RecordError::UnknownObservationType(obs),
            StorageError::InvalidArgument(msg) => RecordError::InvalidArgument(msg),
            other => RecordError::Storage(other),
        }
    }
}

impl From<rusqlite::Error> for RecordError {
    fn from(err: rusqlite::Error) -> Self {
        RecordError::Storage(StorageError::Query(err))
    }
}

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_are_lifted() {
        let err: RecordError = StorageError::UnknownObservationType("hail".to_string()).into();
        assert!(matches!(err, RecordError::UnknownObservationType(ref o) if o == "hail"));

        let err: RecordError = StorageError::InvalidArgument("bad".to_string()).into();
        assert!(matches!(err, RecordError::InvalidArgument(_)));

        let err: RecordError = StorageError::Unavailable("gone".to_string()).into();
        assert!(matches!(err, RecordError::Storage(StorageError::Unavailable(_))));
    }
}
