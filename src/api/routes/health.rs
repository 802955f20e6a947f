//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (archive can be opened)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 once the archive database opens read-only.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if check_archive_health(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let archive_ok = check_archive_health(&state).await;

    let normals_status = if state.normals.is_some() {
        "ok"
    } else {
        "disabled"
    };

    Json(HealthResponse {
        status: if archive_ok { "healthy" } else { "unhealthy" }.to_string(),
        archive: if archive_ok { "ok" } else { "error" }.to_string(),
        normals: normals_status.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_archive_health(state: &AppState) -> bool {
    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || store.open_read_connection().map(|_| ())).await;

    match result {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Archive health check failed");
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, "Archive health check task failed");
            false
        }
    }
}
