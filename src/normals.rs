//! Climate Normals
//!
//! Serves pre-computed daily climate normals (precipitation total and
//! max/avg/min temperature per calendar day) from a JSON document produced
//! offline. Monthly normals are derived from the daily table:
//!
//! - `precip_total`: sum of the month's daily values
//! - `temp_max`: largest daily value
//! - `temp_avg`: mean of the daily values
//! - `temp_min`: smallest daily value
//!
//! # Document layout
//!
//! ```text
//! {
//!   "annual_norms":  { ... },
//!   "daily_normals": {
//!     "january": { "precip_total": { "1": 0.1, ... }, "temp_max": {...}, ... },
//!     ...
//!   }
//! }
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::records::parse_month;

/// Errors that can occur while loading or querying normals
#[derive(Error, Debug)]
pub enum NormalsError {
    #[error("Failed to read normals file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse normals file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    #[error("No normals found for {0}")]
    NotFound(String),
}

/// Daily normals of one month, keyed by day-of-month ("1".."31")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthTable {
    #[serde(default)]
    pub precip_total: BTreeMap<String, f64>,
    #[serde(default)]
    pub temp_max: BTreeMap<String, f64>,
    #[serde(default)]
    pub temp_avg: BTreeMap<String, f64>,
    #[serde(default)]
    pub temp_min: BTreeMap<String, f64>,
}

/// The full normals document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalsDocument {
    #[serde(default)]
    pub annual_norms: serde_json::Value,
    /// Keyed by lowercase English month name
    #[serde(default)]
    pub daily_normals: HashMap<String, MonthTable>,
}

/// Normals for one day or one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normals {
    pub precip_total: f64,
    pub temp_max: f64,
    pub temp_avg: f64,
    pub temp_min: f64,
}

/// Loaded normals, read-only after startup
#[derive(Debug, Clone)]
pub struct NormalsStore {
    document: NormalsDocument,
}

impl NormalsStore {
    pub fn new(document: NormalsDocument) -> Self {
        Self { document }
    }

    /// Load a normals document from a JSON file
    pub fn load(path: &Path) -> Result<Self, NormalsError> {
        let file = File::open(path).map_err(|e| NormalsError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let document: NormalsDocument =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| NormalsError::Parse {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        tracing::info!(
            path = %path.display(),
            months = document.daily_normals.len(),
            "Loaded climate normals"
        );
        Ok(Self::new(document))
    }

    /// The whole document
    pub fn document(&self) -> &NormalsDocument {
        &self.document
    }

    /// Annual normals as stored
    pub fn annual(&self) -> &serde_json::Value {
        &self.document.annual_norms
    }

    /// Normals aggregated over one month (name or number)
    pub fn monthly(&self, month: &str) -> Result<Normals, NormalsError> {
        let name = month_key(month)?;
        let table = self
            .document
            .daily_normals
            .get(&name)
            .ok_or_else(|| NormalsError::NotFound(name.clone()))?;

        let precip = table.precip_total.values().copied();
        let max = table.temp_max.values().copied().reduce(f64::max);
        let min = table.temp_min.values().copied().reduce(f64::min);
        let avg = mean(table.temp_avg.values().copied());

        match (max, min, avg) {
            (Some(temp_max), Some(temp_min), Some(temp_avg)) => Ok(Normals {
                precip_total: precip.sum(),
                temp_max,
                temp_avg,
                temp_min,
            }),
            _ => Err(NormalsError::NotFound(name)),
        }
    }

    /// Normals for one day of one month
    pub fn daily(&self, month: &str, day: u32) -> Result<Normals, NormalsError> {
        let name = month_key(month)?;
        let not_found = || NormalsError::NotFound(format!("{} {}", name, day));
        let table = self.document.daily_normals.get(&name).ok_or_else(not_found)?;

        let key = day.to_string();
        let lookup = |values: &BTreeMap<String, f64>| values.get(&key).copied();

        Ok(Normals {
            precip_total: lookup(&table.precip_total).ok_or_else(not_found)?,
            temp_max: lookup(&table.temp_max).ok_or_else(not_found)?,
            temp_avg: lookup(&table.temp_avg).ok_or_else(not_found)?,
            temp_min: lookup(&table.temp_min).ok_or_else(not_found)?,
        })
    }

    /// Normals for the month containing `date`
    pub fn monthly_for(&self, date: NaiveDate) -> Result<Normals, NormalsError> {
        self.monthly(&date.month().to_string())
    }

    /// Normals for the calendar day of `date`
    pub fn daily_for(&self, date: NaiveDate) -> Result<Normals, NormalsError> {
        self.daily(&date.month().to_string(), date.day())
    }
}

/// Lowercase English month name used as the document key
fn month_key(month: &str) -> Result<String, NormalsError> {
    let number = parse_month(month).map_err(|_| NormalsError::InvalidMonth(month.to_string()))?;
    chrono::Month::try_from(number as u8)
        .map(|m| m.name().to_lowercase())
        .map_err(|_| NormalsError::InvalidMonth(month.to_string()))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
