//! Archive Routes
//!
//! Raw-sample endpoints over the `archive` table.
//!
//! - GET /api/v1/archive/por - Period of record
//! - GET /api/v1/archive/obs_types - List observation types
//! - GET /api/v1/archive/:obs_type/data - Samples in a time span
//! - GET /api/v1/archive/:obs_type/data/latest - Most recent sample
//! - GET /api/v1/archive/:obs_type/data/stats - Min/max/avg/sum/count
//! - GET /api/v1/archive/:obs_type/data/aggregate - Fixed-width bins
//! - GET /api/v1/archive/:obs_type/datatype - Declared SQL type

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{AggregateParams, SpanQuery};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::blocking;
use crate::api::state::AppState;
use crate::storage::{BinFunction, Observation, ObservationStats, PeriodOfRecord};

/// GET /api/v1/archive/por
pub async fn period_of_record(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PeriodOfRecord>> {
    let store = state.store.clone();
    let por = blocking(move || store.period_of_record()).await?;
    por.map(Json)
        .ok_or_else(|| ApiError::NotFound("archive contains no records".to_string()))
}

/// GET /api/v1/archive/obs_types
pub async fn observation_types(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<String>>> {
    let store = state.store.clone();
    let columns = blocking(move || store.observation_types()).await?;
    Ok(Json(columns.into_iter().map(|c| c.name).collect()))
}

/// GET /api/v1/archive/:obs_type/datatype
pub async fn datatype(
    State(state): State<Arc<AppState>>,
    Path(obs_type): Path<String>,
) -> ApiResult<Json<String>> {
    let store = state.store.clone();
    let name = obs_type.clone();
    blocking(move || store.datatype(&name))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("observation type '{}'", obs_type)))
}

/// GET /api/v1/archive/:obs_type/data?start=&end=
pub async fn data(
    State(state): State<Arc<AppState>>,
    Path(obs_type): Path<String>,
    Query(query): Query<SpanQuery>,
) -> ApiResult<Json<Vec<Observation>>> {
    let span = query.to_span(state.store.time_basis())?;
    let store = state.store.clone();
    let rows = blocking(move || store.series(&obs_type, span)).await?;
    Ok(Json(rows))
}

/// GET /api/v1/archive/:obs_type/data/latest
pub async fn latest(
    State(state): State<Arc<AppState>>,
    Path(obs_type): Path<String>,
) -> ApiResult<Json<Option<Observation>>> {
    let store = state.store.clone();
    let latest = blocking(move || store.latest(&obs_type)).await?;
    Ok(Json(latest))
}

/// GET /api/v1/archive/:obs_type/data/stats?start=&end=
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Path(obs_type): Path<String>,
    Query(query): Query<SpanQuery>,
) -> ApiResult<Json<ObservationStats>> {
    let span = query.to_span(state.store.time_basis())?;
    let store = state.store.clone();
    let stats = blocking(move || store.stats(&obs_type, span)).await?;
    Ok(Json(stats))
}

/// GET /api/v1/archive/:obs_type/data/aggregate?start=&end=&function=&hours=
pub async fn aggregate(
    State(state): State<Arc<AppState>>,
    Path(obs_type): Path<String>,
    Query(params): Query<AggregateParams>,
) -> ApiResult<Json<Vec<Observation>>> {
    let span = params.span.to_span(state.store.time_basis())?;
    let function: BinFunction = params.function.parse()?;
    if params.hours <= 0 {
        return Err(ApiError::Validation("hours must be greater than 0".to_string()));
    }
    let bin_seconds = params
        .hours
        .checked_mul(3600)
        .ok_or_else(|| ApiError::Validation(format!("hours is too large: {}", params.hours)))?;

    let store = state.store.clone();
    let bins = blocking(move || store.aggregate(&obs_type, span, function, bin_seconds)).await?;
    Ok(Json(bins))
}
