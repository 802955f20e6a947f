//! Record Routes
//!
//! Each endpoint resolves the max, min and sum records of one window.
//!
//! - GET /api/v1/records/:obs_type/daily?month=&day=
//! - GET /api/v1/records/:obs_type/monthly?month=
//! - GET /api/v1/records/:obs_type/yearly?year=
//! - GET /api/v1/records/:obs_type/all_time

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{DayQuery, MonthQuery, RecordResponse, YearQuery};
use crate::api::error::ApiResult;
use crate::api::routes::blocking;
use crate::api::state::AppState;
use crate::records::Window;

/// GET /api/v1/records/:obs_type/daily
pub async fn daily(
    State(state): State<Arc<AppState>>,
    Path(obs_type): Path<String>,
    Query(query): Query<DayQuery>,
) -> ApiResult<Json<RecordResponse>> {
    let window = Window::day(&query.month, query.day)?;
    resolve(state, obs_type, window).await
}

/// GET /api/v1/records/:obs_type/monthly
pub async fn monthly(
    State(state): State<Arc<AppState>>,
    Path(obs_type): Path<String>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<RecordResponse>> {
    let window = Window::month(&query.month)?;
    resolve(state, obs_type, window).await
}

/// GET /api/v1/records/:obs_type/yearly
pub async fn yearly(
    State(state): State<Arc<AppState>>,
    Path(obs_type): Path<String>,
    Query(query): Query<YearQuery>,
) -> ApiResult<Json<RecordResponse>> {
    let window = Window::year(query.year)?;
    resolve(state, obs_type, window).await
}

/// GET /api/v1/records/:obs_type/all_time
pub async fn all_time(
    State(state): State<Arc<AppState>>,
    Path(obs_type): Path<String>,
) -> ApiResult<Json<RecordResponse>> {
    resolve(state, obs_type, Window::AllTime).await
}

async fn resolve(
    state: Arc<AppState>,
    obs_type: String,
    window: Window,
) -> ApiResult<Json<RecordResponse>> {
    let resolver = Arc::clone(&state.resolver);
    let name = obs_type.clone();
    let records = blocking(move || resolver.resolve_all(&name, &window)).await?;

    Ok(Json(RecordResponse {
        obs_type,
        window,
        records,
    }))
}
