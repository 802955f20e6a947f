//! Query Builder
//!
//! Translates (table, columns, calendar predicate, aggregate) into read-only
//! SQL against a daily summary table and parses the rows back.
//!
//! # Tie resolution
//!
//! Extremes are always found with two statements:
//!
//! ```text
//! extreme ← SELECT MAX(max) FROM t WHERE <predicate>
//! ties    ← SELECT maxTime FROM t WHERE <predicate> AND max = extreme
//! ```
//!
//! `ORDER BY max DESC LIMIT 1` would return one row and silently drop every
//! other day that reached the same value.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::records::calendar::{CalendarDialect, SqlFilter};
use crate::records::window::{AggregateKind, CalendarPredicate, Direction, SummaryColumns};
use crate::storage::StorageResult;

/// Column every daily summary row is dated by
const DAY_COLUMN: &str = "dateTime";

/// A rendered statement and its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Extreme value and the raw epoch-second times it occurred at
#[derive(Debug, Clone, PartialEq)]
pub struct RawExtreme {
    pub value: f64,
    pub times: Vec<i64>,
}

/// Per-year reduction applied by `select_year_aggregates`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearAggregate {
    Sum,
    Extreme(Direction),
}

impl YearAggregate {
    fn sql(&self) -> &'static str {
        match self {
            YearAggregate::Sum => "SUM",
            YearAggregate::Extreme(direction) => direction.sql(),
        }
    }
}

/// Builds and runs aggregate queries for one calendar dialect
#[derive(Debug, Clone)]
pub struct QueryBuilder<D> {
    dialect: D,
}

impl<D: CalendarDialect> QueryBuilder<D> {
    pub fn new(dialect: D) -> Self {
        Self { dialect }
    }

    fn filter(&self, predicate: &CalendarPredicate) -> SqlFilter {
        SqlFilter::from_predicate(&self.dialect, predicate, DAY_COLUMN)
    }

    /// `SELECT MAX|MIN(value) ...` over the rows matching `predicate`
    pub fn extreme_value_query(
        &self,
        table: &str,
        value_column: &str,
        predicate: &CalendarPredicate,
        direction: Direction,
    ) -> AggregateQuery {
        let filter = self.filter(predicate);
        AggregateQuery {
            sql: format!(
                "SELECT {}({}) FROM {} {}",
                direction.sql(),
                value_column,
                table,
                filter.where_clause()
            ),
            params: filter.into_params(),
        }
    }

    /// Times of every row matching `predicate` whose value equals `value`
    ///
    /// A row without a recorded time of occurrence is dated by its day.
    pub fn ties_query(
        &self,
        table: &str,
        columns: SummaryColumns,
        predicate: &CalendarPredicate,
        value: f64,
    ) -> AggregateQuery {
        let filter = self
            .filter(predicate)
            .and(format!("{} = ?", columns.value), Value::Real(value));
        let time = if columns.time == DAY_COLUMN {
            DAY_COLUMN.to_string()
        } else {
            format!("COALESCE({}, {})", columns.time, DAY_COLUMN)
        };
        AggregateQuery {
            sql: format!("SELECT {} FROM {} {}", time, table, filter.where_clause()),
            params: filter.into_params(),
        }
    }

    /// `SELECT SUM(value) ...` over the rows matching `predicate`
    pub fn sum_query(
        &self,
        table: &str,
        value_column: &str,
        predicate: &CalendarPredicate,
    ) -> AggregateQuery {
        let filter = self.filter(predicate);
        AggregateQuery {
            sql: format!(
                "SELECT SUM({}) FROM {} {}",
                value_column,
                table,
                filter.where_clause()
            ),
            params: filter.into_params(),
        }
    }

    /// One `(year, aggregate)` row per year among rows matching `predicate`
    pub fn year_aggregate_query(
        &self,
        table: &str,
        value_column: &str,
        predicate: &CalendarPredicate,
        aggregate: YearAggregate,
    ) -> AggregateQuery {
        let filter = self.filter(predicate);
        AggregateQuery {
            sql: format!(
                "SELECT {year} AS year, {func}({value}) FROM {table} {filter} GROUP BY year ORDER BY year",
                year = self.dialect.year_number_expr(DAY_COLUMN),
                func = aggregate.sql(),
                value = value_column,
                table = table,
                filter = filter.where_clause()
            ),
            params: filter.into_params(),
        }
    }

    /// Extreme value among matching rows plus every time it occurred
    ///
    /// Returns `None` when no row matches or every value is NULL.
    pub fn select_extreme(
        &self,
        conn: &Connection,
        table: &str,
        columns: SummaryColumns,
        predicate: &CalendarPredicate,
        direction: Direction,
    ) -> StorageResult<Option<RawExtreme>> {
        let query = self.extreme_value_query(table, columns.value, predicate, direction);
        let value: Option<f64> = conn.query_row(
            &query.sql,
            params_from_iter(query.params.iter()),
            |row| row.get(0),
        )?;

        let Some(value) = value else {
            tracing::debug!(table = %table, ?predicate, "No rows matched extreme search");
            return Ok(None);
        };

        let times = self.select_ties(conn, table, columns, predicate, value)?;
        tracing::debug!(table = %table, value, ties = times.len(), "Resolved extreme");

        Ok(Some(RawExtreme { value, times }))
    }

    /// Times of every matching row whose value equals `value`
    pub fn select_ties(
        &self,
        conn: &Connection,
        table: &str,
        columns: SummaryColumns,
        predicate: &CalendarPredicate,
        value: f64,
    ) -> StorageResult<Vec<i64>> {
        let query = self.ties_query(table, columns, predicate, value);
        let mut stmt = conn.prepare(&query.sql)?;
        let times = stmt
            .query_map(params_from_iter(query.params.iter()), |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(times)
    }

    /// Total of the value column; `None` (not zero) when nothing matched
    pub fn select_sum(
        &self,
        conn: &Connection,
        table: &str,
        value_column: &str,
        predicate: &CalendarPredicate,
    ) -> StorageResult<Option<f64>> {
        let query = self.sum_query(table, value_column, predicate);
        let total: Option<f64> = conn.query_row(
            &query.sql,
            params_from_iter(query.params.iter()),
            |row| row.get(0),
        )?;
        tracing::debug!(table = %table, ?predicate, ?total, "Resolved sum");
        Ok(total)
    }

    /// Heaviest single day among matching rows, ties included
    pub fn select_peak_day(
        &self,
        conn: &Connection,
        table: &str,
        predicate: &CalendarPredicate,
    ) -> StorageResult<Option<RawExtreme>> {
        self.select_extreme(
            conn,
            table,
            AggregateKind::Sum.columns(),
            predicate,
            Direction::Max,
        )
    }

    /// Per-year aggregate of the value column, oldest year first
    ///
    /// Years whose values are all NULL are omitted.
    pub fn select_year_aggregates(
        &self,
        conn: &Connection,
        table: &str,
        value_column: &str,
        predicate: &CalendarPredicate,
        aggregate: YearAggregate,
    ) -> StorageResult<Vec<(i32, f64)>> {
        let query = self.year_aggregate_query(table, value_column, predicate, aggregate);
        let mut stmt = conn.prepare(&query.sql)?;
        let rows = stmt
            .query_map(params_from_iter(query.params.iter()), |row| {
                Ok((row.get::<_, i32>(0)?, row.get::<_, Option<f64>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter_map(|(year, value)| value.map(|v| (year, v)))
            .collect();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::calendar::SqliteCalendar;
    use crate::storage::testutil::ArchiveFixture;
    use crate::storage::TimeBasis;

    fn builder() -> QueryBuilder<SqliteCalendar> {
        QueryBuilder::new(SqliteCalendar::new(TimeBasis::Utc))
    }

    fn july_fourth() -> CalendarPredicate {
        CalendarPredicate {
            year: None,
            month: Some(7),
            day: Some(4),
        }
    }

    #[test]
    fn test_extreme_value_query_text() {
        let q = builder().extreme_value_query(
            "archive_day_outTemp",
            "max",
            &july_fourth(),
            Direction::Max,
        );
        assert!(q.sql.starts_with("SELECT MAX(max) FROM archive_day_outTemp WHERE"));
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn test_ties_query_appends_equality() {
        let q = builder().ties_query(
            "archive_day_outTemp",
            AggregateKind::Min.columns(),
            &CalendarPredicate::default(),
            -3.5,
        );
        assert_eq!(
            q.sql,
            "SELECT COALESCE(minTime, dateTime) FROM archive_day_outTemp WHERE min = ?"
        );
        assert_eq!(q.params, vec![Value::Real(-3.5)]);

        let q = builder().ties_query(
            "archive_day_rain",
            AggregateKind::Sum.columns(),
            &CalendarPredicate::default(),
            1.5,
        );
        assert_eq!(q.sql, "SELECT dateTime FROM archive_day_rain WHERE sum = ?");
    }

    #[test]
    fn test_tie_without_time_is_dated_by_day() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("outTemp", (2020, 7, 4), 70.0, 95.0, 0.0);
        fixture.add_day("outTemp", (2021, 7, 4), 72.0, 95.0, 0.0);
        rusqlite::Connection::open(&fixture.path)
            .unwrap()
            .execute(
                "UPDATE archive_day_outTemp SET maxtime = NULL WHERE dateTime = ?1",
                [ArchiveFixture::day_start((2021, 7, 4))],
            )
            .unwrap();
        let conn = fixture.store().open_read_connection().unwrap();

        let raw = builder()
            .select_extreme(
                &conn,
                "archive_day_outTemp",
                AggregateKind::Max.columns(),
                &july_fourth(),
                Direction::Max,
            )
            .unwrap()
            .unwrap();

        assert_eq!(raw.value, 95.0);
        let mut times = raw.times;
        times.sort();
        assert_eq!(
            times,
            vec![
                ArchiveFixture::max_time((2020, 7, 4)),
                ArchiveFixture::day_start((2021, 7, 4)),
            ]
        );
    }

    #[test]
    fn test_select_extreme_keeps_ties() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("outTemp", (2020, 7, 4), 70.0, 95.0, 0.0);
        fixture.add_day("outTemp", (2021, 7, 4), 72.0, 95.0, 0.0);
        fixture.add_day("outTemp", (2022, 7, 4), 65.0, 90.0, 0.0);
        fixture.add_day("outTemp", (2022, 7, 5), 60.0, 99.0, 0.0);
        let conn = fixture.store().open_read_connection().unwrap();

        let raw = builder()
            .select_extreme(
                &conn,
                "archive_day_outTemp",
                AggregateKind::Max.columns(),
                &july_fourth(),
                Direction::Max,
            )
            .unwrap()
            .unwrap();

        assert_eq!(raw.value, 95.0);
        let mut times = raw.times;
        times.sort();
        assert_eq!(
            times,
            vec![
                ArchiveFixture::max_time((2020, 7, 4)),
                ArchiveFixture::max_time((2021, 7, 4)),
            ]
        );
    }

    #[test]
    fn test_select_extreme_min_direction() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("outTemp", (2020, 1, 10), -5.0, 20.0, 0.0);
        fixture.add_day("outTemp", (2021, 2, 10), -12.0, 15.0, 0.0);
        let conn = fixture.store().open_read_connection().unwrap();

        let raw = builder()
            .select_extreme(
                &conn,
                "archive_day_outTemp",
                AggregateKind::Min.columns(),
                &CalendarPredicate::default(),
                Direction::Min,
            )
            .unwrap()
            .unwrap();
        assert_eq!(raw.value, -12.0);
        assert_eq!(raw.times, vec![ArchiveFixture::min_time((2021, 2, 10))]);
    }

    #[test]
    fn test_select_extreme_no_rows() {
        let fixture = ArchiveFixture::new();
        fixture.add_daily_table("outTemp");
        let conn = fixture.store().open_read_connection().unwrap();

        let raw = builder()
            .select_extreme(
                &conn,
                "archive_day_outTemp",
                AggregateKind::Max.columns(),
                &july_fourth(),
                Direction::Max,
            )
            .unwrap();
        assert!(raw.is_none());
    }

    #[test]
    fn test_select_sum_distinguishes_zero_from_none() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("rain", (2020, 8, 1), 0.0, 0.0, 0.0);
        fixture.add_day("rain", (2020, 8, 2), 0.0, 0.0, 0.0);
        let conn = fixture.store().open_read_connection().unwrap();
        let b = builder();

        let august = CalendarPredicate {
            month: Some(8),
            ..Default::default()
        };
        let total = b
            .select_sum(&conn, "archive_day_rain", "sum", &august)
            .unwrap();
        assert_eq!(total, Some(0.0));

        let september = CalendarPredicate {
            month: Some(9),
            ..Default::default()
        };
        let total = b
            .select_sum(&conn, "archive_day_rain", "sum", &september)
            .unwrap();
        assert_eq!(total, None);
    }

    #[test]
    fn test_select_peak_day_uses_day_timestamp() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("rain", (2020, 8, 1), 0.0, 0.4, 1.5);
        fixture.add_day("rain", (2020, 8, 2), 0.0, 0.2, 0.5);
        let conn = fixture.store().open_read_connection().unwrap();

        let peak = builder()
            .select_peak_day(&conn, "archive_day_rain", &CalendarPredicate::default())
            .unwrap()
            .unwrap();
        assert_eq!(peak.value, 1.5);
        assert_eq!(peak.times, vec![ArchiveFixture::day_start((2020, 8, 1))]);
    }

    #[test]
    fn test_select_year_aggregates() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("rain", (2020, 8, 1), 0.0, 0.0, 1.0);
        fixture.add_day("rain", (2020, 8, 2), 0.0, 0.0, 2.0);
        fixture.add_day("rain", (2021, 8, 1), 0.0, 0.0, 4.0);
        fixture.add_day_values("rain", (2022, 8, 1), None, None, None);
        let conn = fixture.store().open_read_connection().unwrap();

        let august = CalendarPredicate {
            month: Some(8),
            ..Default::default()
        };
        let totals = builder()
            .select_year_aggregates(&conn, "archive_day_rain", "sum", &august, YearAggregate::Sum)
            .unwrap();
        assert_eq!(totals, vec![(2020, 3.0), (2021, 4.0)]);
    }
}
