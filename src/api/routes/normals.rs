//! Normals Routes
//!
//! - GET /api/v1/normals - Whole normals document
//! - GET /api/v1/normals/annual - Annual normals
//! - GET /api/v1/normals/monthly?month= - One month
//! - GET /api/v1/normals/monthly/current - The current month
//! - GET /api/v1/normals/daily?month=&day= - One calendar day
//! - GET /api/v1/normals/daily/today - Today

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Local;
use std::sync::Arc;

use crate::api::dto::{DayQuery, MonthQuery};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::normals::{Normals, NormalsDocument, NormalsStore};

fn normals(state: &AppState) -> ApiResult<&NormalsStore> {
    state
        .normals
        .as_deref()
        .ok_or_else(|| ApiError::NotFound("climate normals are not configured".to_string()))
}

/// GET /api/v1/normals
pub async fn document(State(state): State<Arc<AppState>>) -> ApiResult<Json<NormalsDocument>> {
    Ok(Json(normals(&state)?.document().clone()))
}

/// GET /api/v1/normals/annual
pub async fn annual(State(state): State<Arc<AppState>>) -> ApiResult<Json<serde_json::Value>> {
    Ok(Json(normals(&state)?.annual().clone()))
}

/// GET /api/v1/normals/monthly
pub async fn monthly(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<Normals>> {
    Ok(Json(normals(&state)?.monthly(&query.month)?))
}

/// GET /api/v1/normals/monthly/current
pub async fn current_month(State(state): State<Arc<AppState>>) -> ApiResult<Json<Normals>> {
    let today = Local::now().date_naive();
    Ok(Json(normals(&state)?.monthly_for(today)?))
}

/// GET /api/v1/normals/daily
pub async fn daily(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DayQuery>,
) -> ApiResult<Json<Normals>> {
    Ok(Json(normals(&state)?.daily(&query.month, query.day)?))
}

/// GET /api/v1/normals/daily/today
pub async fn today(State(state): State<Arc<AppState>>) -> ApiResult<Json<Normals>> {
    let today = Local::now().date_naive();
    Ok(Json(normals(&state)?.daily_for(today)?))
}
