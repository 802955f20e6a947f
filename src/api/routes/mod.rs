//! API Routes
//!
//! Route handlers organized by functionality.

pub mod archive;
pub mod health;
pub mod normals;
pub mod records;

use crate::api::error::{ApiError, ApiResult};

/// Run a synchronous archive call off the async runtime
pub(crate) async fn blocking<T, E, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("Archive task failed: {}", e)))?
        .map_err(Into::into)
}
