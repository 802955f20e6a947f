//! Weather Archive REST API
//!
//! HTTP API layer, built with Axum.
//!
//! # Endpoints
//!
//! ## Archive
//! - `GET /api/v1/archive/por` - Period of record
//! - `GET /api/v1/archive/obs_types` - Observation types
//! - `GET /api/v1/archive/:obs_type/datatype` - Declared SQL type
//! - `GET /api/v1/archive/:obs_type/data` - Samples (`start`, `end` as YYYYMMDDHHMM)
//! - `GET /api/v1/archive/:obs_type/data/latest` - Most recent sample
//! - `GET /api/v1/archive/:obs_type/data/stats` - Summary statistics
//! - `GET /api/v1/archive/:obs_type/data/aggregate` - Binned avg/min/max
//!
//! ## Records
//! - `GET /api/v1/records/:obs_type/daily?month=&day=`
//! - `GET /api/v1/records/:obs_type/monthly?month=`
//! - `GET /api/v1/records/:obs_type/yearly?year=`
//! - `GET /api/v1/records/:obs_type/all_time`
//!
//! ## Normals
//! - `GET /api/v1/normals`, `/normals/annual`
//! - `GET /api/v1/normals/monthly?month=`, `/normals/monthly/current`
//! - `GET /api/v1/normals/daily?month=&day=`, `/normals/daily/today`
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use wxarchive::api::{serve, AppState};
//! use wxarchive::config::Config;
//! use wxarchive::storage::ArchiveStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let store = ArchiveStore::new(config.archive.options());
//!
//!     let state = AppState::new(store, config.api.clone());
//!     serve(state, &config.api).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    let api_routes = Router::new()
        // Archive routes
        .route("/archive/por", get(routes::archive::period_of_record))
        .route("/archive/obs_types", get(routes::archive::observation_types))
        .route("/archive/:obs_type/datatype", get(routes::archive::datatype))
        .route("/archive/:obs_type/data", get(routes::archive::data))
        .route("/archive/:obs_type/data/latest", get(routes::archive::latest))
        .route("/archive/:obs_type/data/stats", get(routes::archive::stats))
        .route("/archive/:obs_type/data/aggregate", get(routes::archive::aggregate))
        // Record routes
        .route("/records/:obs_type/daily", get(routes::records::daily))
        .route("/records/:obs_type/monthly", get(routes::records::monthly))
        .route("/records/:obs_type/yearly", get(routes::records::yearly))
        .route("/records/:obs_type/all_time", get(routes::records::all_time))
        // Normals routes
        .route("/normals", get(routes::normals::document))
        .route("/normals/annual", get(routes::normals::annual))
        .route("/normals/monthly", get(routes::normals::monthly))
        .route("/normals/monthly/current", get(routes::normals::current_month))
        .route("/normals/daily", get(routes::normals::daily))
        .route("/normals/daily/today", get(routes::normals::today));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("wxarchive API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("wxarchive API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
