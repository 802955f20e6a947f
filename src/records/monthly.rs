//! Monthly two-level reductions
//!
//! A monthly record spans the same month in every year. Max/Min first reduce
//! each year's month to its own extreme, then pick the global extreme across
//! those per-year extremes, and only then collect the tied rows, restricted
//! to the years that reached it. The wettest-year search reuses the same
//! cross-year step on per-year totals.

use rusqlite::Connection;

use crate::records::builder::{QueryBuilder, RawExtreme, YearAggregate};
use crate::records::calendar::CalendarDialect;
use crate::records::result::YearTotal;
use crate::records::window::{CalendarPredicate, Direction, SummaryColumns};
use crate::storage::StorageResult;

/// Winning value across years and every year that reached it
#[derive(Debug, Clone, PartialEq)]
pub struct YearReduction {
    pub value: f64,
    pub years: Vec<i32>,
}

/// Reduce per-year values to the global extreme, keeping tied years
///
/// Years are reported in input order.
pub fn reduce_across_years(per_year: &[(i32, f64)], direction: Direction) -> Option<YearReduction> {
    let mut best: Option<YearReduction> = None;

    for &(year, value) in per_year {
        match best.as_mut() {
            None => {
                best = Some(YearReduction {
                    value,
                    years: vec![year],
                })
            }
            Some(current) if direction.beats(value, current.value) => {
                current.value = value;
                current.years = vec![year];
            }
            Some(current) if value == current.value => current.years.push(year),
            Some(_) => {}
        }
    }

    best
}

/// Monthly Max/Min record for one daily summary table
pub struct MonthlyExtreme<'a, D> {
    builder: &'a QueryBuilder<D>,
    table: &'a str,
    month: u32,
}

impl<'a, D: CalendarDialect> MonthlyExtreme<'a, D> {
    pub fn new(builder: &'a QueryBuilder<D>, table: &'a str, month: u32) -> Self {
        Self {
            builder,
            table,
            month,
        }
    }

    fn predicate(&self) -> CalendarPredicate {
        CalendarPredicate {
            month: Some(self.month),
            ..Default::default()
        }
    }

    /// Extreme across all years' instances of the month, with all tied times
    pub fn resolve(
        &self,
        conn: &Connection,
        columns: SummaryColumns,
        direction: Direction,
    ) -> StorageResult<Option<RawExtreme>> {
        let predicate = self.predicate();
        let per_year = self.builder.select_year_aggregates(
            conn,
            self.table,
            columns.value,
            &predicate,
            YearAggregate::Extreme(direction),
        )?;

        let Some(winner) = reduce_across_years(&per_year, direction) else {
            return Ok(None);
        };

        let mut times = Vec::new();
        for &year in &winner.years {
            times.extend(self.builder.select_ties(
                conn,
                self.table,
                columns,
                &predicate.in_year(year),
                winner.value,
            )?);
        }

        tracing::debug!(
            table = %self.table,
            month = self.month,
            years = ?winner.years,
            value = winner.value,
            "Resolved monthly extreme"
        );

        Ok(Some(RawExtreme {
            value: winner.value,
            times,
        }))
    }

    /// Year(s) with the largest month total of `value_column`
    pub fn wettest_year(
        &self,
        conn: &Connection,
        value_column: &str,
    ) -> StorageResult<Option<YearTotal>> {
        let totals = self.builder.select_year_aggregates(
            conn,
            self.table,
            value_column,
            &self.predicate(),
            YearAggregate::Sum,
        )?;

        Ok(
            reduce_across_years(&totals, Direction::Max).map(|winner| YearTotal {
                total: winner.value,
                years: winner.years,
            }),
        )
    }
}
