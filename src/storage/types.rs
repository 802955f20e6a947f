//! Core data types for the weather archive
//!
//! This module defines the types shared by the archive reader and the
//! records engine:
//! - `TimeBasis`: whether calendar fields are derived in UTC or local time
//! - `TimeSpan`: an optional, inclusive interval of epoch seconds
//! - `Observation`, `ObservationStats`, `PeriodOfRecord`, `ColumnInfo`: query results
//! - `BinFunction`: aggregation applied to fixed-width time bins

use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::storage::error::{StorageError, StorageResult};

/// Time zone the archive's day boundaries are expressed in
///
/// weewx writes daily summaries on local-midnight boundaries; archives
/// converted to UTC use `Utc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBasis {
    /// Calendar fields derived in UTC
    Utc,
    /// Calendar fields derived in the host's local time zone
    #[default]
    Local,
}

impl TimeBasis {
    /// Interpret a wall-clock time in this basis and return epoch seconds
    ///
    /// Ambiguous local times (DST fold) resolve to the earlier instant.
    pub fn to_epoch(self, naive: NaiveDateTime) -> Option<i64> {
        match self {
            TimeBasis::Utc => Some(Utc.from_utc_datetime(&naive).timestamp()),
            TimeBasis::Local => chrono::Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.timestamp()),
        }
    }
}

impl fmt::Display for TimeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBasis::Utc => write!(f, "utc"),
            TimeBasis::Local => write!(f, "local"),
        }
    }
}

impl FromStr for TimeBasis {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utc" => Ok(TimeBasis::Utc),
            "local" | "localtime" => Ok(TimeBasis::Local),
            other => Err(StorageError::InvalidArgument(format!(
                "unknown time basis '{}', expected utc or local",
                other
            ))),
        }
    }
}

/// An inclusive interval of epoch seconds; either bound may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSpan {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl TimeSpan {
    /// The whole archive
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a span, rejecting start > end
    pub fn new(start: Option<i64>, end: Option<i64>) -> StorageResult<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(StorageError::InvalidTimeSpan);
            }
        }
        Ok(Self { start, end })
    }

    /// Both bounds closed
    pub fn between(start: i64, end: i64) -> StorageResult<Self> {
        Self::new(Some(start), Some(end))
    }

    /// Render a `WHERE` clause on `dateTime` with positional parameters
    ///
    /// Returns an empty clause when both bounds are open.
    pub fn where_clause(&self) -> (String, Vec<i64>) {
        match (self.start, self.end) {
            (Some(s), Some(e)) => ("WHERE dateTime BETWEEN ? AND ?".to_string(), vec![s, e]),
            (Some(s), None) => ("WHERE dateTime >= ?".to_string(), vec![s]),
            (None, Some(e)) => ("WHERE dateTime <= ?".to_string(), vec![e]),
            (None, None) => (String::new(), Vec::new()),
        }
    }
}

/// A single archive sample for one observation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Epoch seconds
    pub timestamp: i64,
    /// Observed value, `None` when the sensor reported nothing
    pub value: Option<f64>,
}

/// Summary statistics over a span of archive samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub sum: Option<f64>,
    pub count: u64,
}

/// First and last archive timestamps and the distance between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodOfRecord {
    pub start: String,
    pub end: String,
    pub num_days: i64,
    pub num_years: f64,
}

impl PeriodOfRecord {
    /// Derive the period from the first and last archive timestamps
    pub fn from_bounds(first: i64, last: i64) -> Self {
        let num_days = (last - first).div_euclid(86_400);
        let num_years = (num_days as f64 / 365.25 * 10.0).round() / 10.0;
        Self {
            start: iso8601_utc(first),
            end: iso8601_utc(last),
            num_days,
            num_years,
        }
    }
}

/// Name and declared SQL type of an archive column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: String,
}

/// Aggregation applied to each fixed-width time bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinFunction {
    Avg,
    Min,
    Max,
}

impl BinFunction {
    /// SQL aggregate function name
    pub fn sql(&self) -> &'static str {
        match self {
            BinFunction::Avg => "AVG",
            BinFunction::Min => "MIN",
            BinFunction::Max => "MAX",
        }
    }
}

impl FromStr for BinFunction {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "avg" => Ok(BinFunction::Avg),
            "min" => Ok(BinFunction::Min),
            "max" => Ok(BinFunction::Max),
            other => Err(StorageError::InvalidArgument(format!(
                "aggregate function must be one of avg, min, max (got '{}')",
                other
            ))),
        }
    }
}

/// Format epoch seconds as ISO-8601 UTC with a trailing `Z`
pub fn iso8601_utc(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// True for names safe to splice into SQL as a column or table suffix
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
