//! Record result shapes
//!
//! One shape per (window, aggregate) combination:
//!
//! | Window          | Max / Min   | Sum              |
//! |-----------------|-------------|------------------|
//! | Day             | `Extreme`   | `Extreme`        |
//! | Month           | `Extreme`   | `MonthlyTotal`   |
//! | Year / AllTime  | `Extreme`   | `Total`          |

use serde::{Deserialize, Serialize};

use crate::records::builder::RawExtreme;
use crate::storage::iso8601_utc;

/// An extreme value and every time it was reached
///
/// `times` are ISO-8601 UTC, ascending. Identical timestamps from separate
/// tied rows are kept as separate entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeRecord {
    pub value: f64,
    pub times: Vec<String>,
}

impl ExtremeRecord {
    /// Sort raw epoch times by instant and format them
    pub fn from_raw(raw: RawExtreme) -> Self {
        let mut times = raw.times;
        times.sort_unstable();
        Self {
            value: raw.value,
            times: times.into_iter().map(iso8601_utc).collect(),
        }
    }
}

/// Largest per-year total and the year(s) that reached it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearTotal {
    pub total: f64,
    pub years: Vec<i32>,
}

/// Yearly or all-time accumulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalRecord {
    pub total: f64,
    /// Heaviest single day; `None` only if every day's sum is NULL
    pub peak_day: Option<ExtremeRecord>,
}

/// Monthly accumulation across all years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotalRecord {
    pub wettest_year: Option<YearTotal>,
    pub peak_day: Option<ExtremeRecord>,
}

/// A resolved record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    Extreme(ExtremeRecord),
    Total(TotalRecord),
    MonthlyTotal(MonthlyTotalRecord),
}

impl Record {
    pub fn as_extreme(&self) -> Option<&ExtremeRecord> {
        match self {
            Record::Extreme(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_total(&self) -> Option<&TotalRecord> {
        match self {
            Record::Total(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_monthly_total(&self) -> Option<&MonthlyTotalRecord> {
        match self {
            Record::MonthlyTotal(r) => Some(r),
            _ => None,
        }
    }
}

/// Max, min and sum records for one observation type and window
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordSet {
    pub max: Option<Record>,
    pub min: Option<Record>,
    pub sum: Option<Record>,
}
