//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::normals::NormalsError;
use crate::records::RecordError;
use crate::storage::StorageError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record query failed
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Archive query failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Normals lookup failed
    #[error("Normals error: {0}")]
    Normals(#[from] NormalsError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

fn storage_status(err: &StorageError) -> (StatusCode, &'static str) {
    match err {
        StorageError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE"),
        StorageError::UnknownObservationType(_) => {
            (StatusCode::NOT_FOUND, "UNKNOWN_OBSERVATION_TYPE")
        }
        StorageError::InvalidArgument(_) | StorageError::InvalidTimeSpan => {
            (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT")
        }
        StorageError::Query(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
    }
}

impl ApiError {
    /// HTTP status and machine-readable code for this error
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Record(RecordError::InvalidArgument(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT")
            }
            ApiError::Record(RecordError::UnknownObservationType(_)) => {
                (StatusCode::NOT_FOUND, "UNKNOWN_OBSERVATION_TYPE")
            }
            ApiError::Record(RecordError::Storage(e)) | ApiError::Storage(e) => storage_status(e),
            ApiError::Normals(NormalsError::InvalidMonth(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT")
            }
            ApiError::Normals(NormalsError::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Normals(_) => (StatusCode::INTERNAL_SERVER_ERROR, "NORMALS_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();

        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err: ApiError = RecordError::InvalidArgument("month".to_string()).into();
        assert_eq!(err.status().0, StatusCode::BAD_REQUEST);

        let err: ApiError = RecordError::UnknownObservationType("hail".to_string()).into();
        assert_eq!(err.status().0, StatusCode::NOT_FOUND);

        let err: ApiError =
            RecordError::Storage(StorageError::Unavailable("gone".to_string())).into();
        assert_eq!(err.status().0, StatusCode::SERVICE_UNAVAILABLE);

        let err: ApiError = StorageError::Query(rusqlite::Error::InvalidQuery).into();
        assert_eq!(err.status(), (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"));
    }
}
