//! Data Transfer Objects
//!
//! Query-string and response types for the API endpoints.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::records::{RecordSet, Window};
use crate::storage::{TimeBasis, TimeSpan};

/// Wall-clock format accepted for `start` / `end`, e.g. `202007041530`
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

// ============================================
// ARCHIVE DTOs
// ============================================

/// Optional time bounds for raw-sample queries
#[derive(Debug, Default, Deserialize)]
pub struct SpanQuery {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl SpanQuery {
    /// Interpret the bounds in the archive's time basis
    pub fn to_span(&self, basis: TimeBasis) -> ApiResult<TimeSpan> {
        let start = self
            .start
            .as_deref()
            .map(|s| parse_wall_clock(s, basis))
            .transpose()?;
        let end = self
            .end
            .as_deref()
            .map(|s| parse_wall_clock(s, basis))
            .transpose()?;
        Ok(TimeSpan::new(start, end)?)
    }
}

/// Binned aggregation parameters
#[derive(Debug, Deserialize)]
pub struct AggregateParams {
    #[serde(flatten)]
    pub span: SpanQuery,
    /// avg, min or max
    #[serde(default = "default_function")]
    pub function: String,
    /// Bin width in hours
    #[serde(default = "default_hours")]
    pub hours: i64,
}

fn default_function() -> String {
    "avg".to_string()
}

fn default_hours() -> i64 {
    1
}

fn parse_wall_clock(value: &str, basis: TimeBasis) -> ApiResult<i64> {
    let naive = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| {
        ApiError::Validation(format!(
            "'{}' is not a timestamp of the form YYYYMMDDHHMM",
            value
        ))
    })?;
    basis.to_epoch(naive).ok_or_else(|| {
        ApiError::Validation(format!("'{}' does not exist in the local time zone", value))
    })
}

// ============================================
// RECORD DTOs
// ============================================

/// `?month=&day=`
#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub month: String,
    pub day: u32,
}

/// `?month=`
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: String,
}

/// `?year=`
#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: i32,
}

/// Records for one observation type and window
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub obs_type: String,
    pub window: Window,
    #[serde(flatten)]
    pub records: RecordSet,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub archive: String,
    pub normals: String,
    pub uptime_seconds: u64,
    pub version: String,
}
