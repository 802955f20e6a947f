//! Window descriptors and aggregate kinds
//!
//! A `Window` names the calendar scope of a record query. It compiles to a
//! `CalendarPredicate` that compares calendar fields of each daily row, so a
//! `Day` window matches the same day-of-year in every recorded year.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::records::error::{RecordError, RecordResult};

/// Calendar scope of a record query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Window {
    /// One day-of-year across all years
    Day { month: u32, day: u32 },
    /// One month across all years
    Month { month: u32 },
    /// One calendar year
    Year { year: i32 },
    /// All recorded history
    AllTime,
}

impl Window {
    /// Day-of-year window; `month` may be a name or number
    ///
    /// Days valid for some month (1..=31) are accepted even when this month
    /// is shorter; such windows simply match nothing.
    pub fn day(month: &str, day: u32) -> RecordResult<Self> {
        let month = parse_month(month)?;
        if !(1..=31).contains(&day) {
            return Err(RecordError::InvalidArgument(format!(
                "day of month must be between 1 and 31 (got {})",
                day
            )));
        }
        Ok(Window::Day { month, day })
    }

    /// Month window; `month` may be a name or number
    pub fn month(month: &str) -> RecordResult<Self> {
        Ok(Window::Month {
            month: parse_month(month)?,
        })
    }

    /// Single-year window
    pub fn year(year: i32) -> RecordResult<Self> {
        if !(1..=9999).contains(&year) {
            return Err(RecordError::InvalidArgument(format!(
                "year must be between 1 and 9999 (got {})",
                year
            )));
        }
        Ok(Window::Year { year })
    }

    /// Predicate selecting the daily rows inside this window
    pub fn predicate(&self) -> CalendarPredicate {
        match *self {
            Window::Day { month, day } => CalendarPredicate {
                month: Some(month),
                day: Some(day),
                ..Default::default()
            },
            Window::Month { month } => CalendarPredicate {
                month: Some(month),
                ..Default::default()
            },
            Window::Year { year } => CalendarPredicate {
                year: Some(year),
                ..Default::default()
            },
            Window::AllTime => CalendarPredicate::default(),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Day { month, day } => write!(f, "day {:02}-{:02}", month, day),
            Window::Month { month } => write!(f, "month {:02}", month),
            Window::Year { year } => write!(f, "year {}", year),
            Window::AllTime => write!(f, "all time"),
        }
    }
}

/// Calendar fields a daily row must match; `None` matches anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalendarPredicate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl CalendarPredicate {
    /// Narrow this predicate to a single year
    pub fn in_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }
}

/// Which summary a record reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateKind {
    Max,
    Min,
    Sum,
}

impl AggregateKind {
    pub const ALL: [AggregateKind; 3] = [AggregateKind::Max, AggregateKind::Min, AggregateKind::Sum];

    /// Daily summary value and time-of-occurrence columns read for this kind
    ///
    /// `sum` has no time column of its own; its rows are dated by `dateTime`.
    pub fn columns(&self) -> SummaryColumns {
        match self {
            AggregateKind::Max => SummaryColumns::new("max", "maxTime"),
            AggregateKind::Min => SummaryColumns::new("min", "minTime"),
            AggregateKind::Sum => SummaryColumns::new("sum", "dateTime"),
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateKind::Max => write!(f, "max"),
            AggregateKind::Min => write!(f, "min"),
            AggregateKind::Sum => write!(f, "sum"),
        }
    }
}

impl FromStr for AggregateKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "max" => Ok(AggregateKind::Max),
            "min" => Ok(AggregateKind::Min),
            "sum" => Ok(AggregateKind::Sum),
            other => Err(RecordError::InvalidArgument(format!(
                "unknown aggregate kind '{}', expected max, min or sum",
                other
            ))),
        }
    }
}

/// Direction of an extreme search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Max,
    Min,
}

impl Direction {
    /// SQL aggregate function
    pub fn sql(&self) -> &'static str {
        match self {
            Direction::Max => "MAX",
            Direction::Min => "MIN",
        }
    }

    /// True if `candidate` beats `current` in this direction
    pub fn beats(&self, candidate: f64, current: f64) -> bool {
        match self {
            Direction::Max => candidate > current,
            Direction::Min => candidate < current,
        }
    }
}

/// Value column and time-of-occurrence column of a daily summary table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryColumns {
    pub value: &'static str,
    pub time: &'static str,
}

impl SummaryColumns {
    pub const fn new(value: &'static str, time: &'static str) -> Self {
        Self { value, time }
    }
}

/// Parse a month name (full or three-letter, any case) or number to 1..=12
pub fn parse_month(month: &str) -> RecordResult<u32> {
    let trimmed = month.trim();

    if let Ok(n) = trimmed.parse::<u32>() {
        if (1..=12).contains(&n) {
            return Ok(n);
        }
        return Err(RecordError::InvalidArgument(format!(
            "month number must be between 1 and 12 (got {})",
            n
        )));
    }

    trimmed
        .parse::<chrono::Month>()
        .map(|m| m.number_from_month())
        .map_err(|_| RecordError::InvalidArgument(format!("unknown month '{}'", month)))
}
