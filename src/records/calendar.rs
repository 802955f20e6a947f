//! Calendar bucketing
//!
//! Deriving year/month/day from a stored timestamp is the only place the
//! record queries depend on a storage engine's date-function dialect and on a
//! time zone. `CalendarDialect` isolates both.

use rusqlite::types::Value;

use crate::records::window::CalendarPredicate;
use crate::storage::TimeBasis;

/// A calendar field extracted from a timestamp column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarField {
    Year,
    Month,
    Day,
}

/// Renders calendar-field expressions for one storage dialect
pub trait CalendarDialect: Send + Sync {
    /// Text expression yielding `field` of `column`, zero-padded
    fn field_expr(&self, field: CalendarField, column: &str) -> String;

    /// Integer expression yielding the year of `column`
    fn year_number_expr(&self, column: &str) -> String;

    /// Encode a field value the way `field_expr` renders it
    fn encode(&self, field: CalendarField, value: i64) -> String {
        match field {
            CalendarField::Year => format!("{:04}", value),
            CalendarField::Month | CalendarField::Day => format!("{:02}", value),
        }
    }
}

/// SQLite `strftime` over epoch-second columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqliteCalendar {
    basis: TimeBasis,
}

impl SqliteCalendar {
    pub fn new(basis: TimeBasis) -> Self {
        Self { basis }
    }

    fn modifiers(&self) -> &'static str {
        match self.basis {
            TimeBasis::Utc => "'unixepoch'",
            TimeBasis::Local => "'unixepoch', 'localtime'",
        }
    }
}

impl CalendarDialect for SqliteCalendar {
    fn field_expr(&self, field: CalendarField, column: &str) -> String {
        let format = match field {
            CalendarField::Year => "%Y",
            CalendarField::Month => "%m",
            CalendarField::Day => "%d",
        };
        format!("strftime('{}', {}, {})", format, column, self.modifiers())
    }

    fn year_number_expr(&self, column: &str) -> String {
        format!(
            "CAST({} AS INTEGER)",
            self.field_expr(CalendarField::Year, column)
        )
    }
}

/// A rendered SQL condition list with its positional parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFilter {
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl SqlFilter {
    /// Render a calendar predicate over `column`
    pub fn from_predicate(
        dialect: &dyn CalendarDialect,
        predicate: &CalendarPredicate,
        column: &str,
    ) -> Self {
        let mut filter = Self::default();
        let fields = [
            (CalendarField::Year, predicate.year.map(i64::from)),
            (CalendarField::Month, predicate.month.map(i64::from)),
            (CalendarField::Day, predicate.day.map(i64::from)),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                filter = filter.and(
                    format!("{} = ?", dialect.field_expr(field, column)),
                    Value::Text(dialect.encode(field, value)),
                );
            }
        }
        filter
    }

    /// Append one condition with one parameter
    pub fn and(mut self, condition: impl Into<String>, param: Value) -> Self {
        self.conditions.push(condition.into());
        self.params.push(param);
        self
    }

    /// `WHERE a AND b ...`, or empty when there are no conditions
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}
