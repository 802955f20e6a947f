//! Record Resolver
//!
//! Answers "what is the record max/min/sum of observation O over window W" by
//! composing Query Builder calls per window kind.
//!
//! # Consistency
//!
//! Each request opens one read-only connection and runs its sub-queries in
//! autocommit mode. The sub-queries behind one composite record (a monthly
//! total and its peak day, say) do not share a snapshot: if the station
//! appends while a record is being resolved, the parts may observe different
//! archive states. No transaction is held.

use rusqlite::Connection;

use crate::records::builder::QueryBuilder;
use crate::records::calendar::{CalendarDialect, SqliteCalendar};
use crate::records::error::RecordResult;
use crate::records::monthly::MonthlyExtreme;
use crate::records::result::{ExtremeRecord, MonthlyTotalRecord, Record, RecordSet, TotalRecord};
use crate::records::window::{AggregateKind, Direction, Window};
use crate::storage::ArchiveStore;

/// Resolves records against one archive
#[derive(Debug, Clone)]
pub struct RecordResolver<D = SqliteCalendar> {
    store: ArchiveStore,
    builder: QueryBuilder<D>,
}

impl RecordResolver<SqliteCalendar> {
    /// Resolver using SQLite date functions in the store's time basis
    pub fn new(store: ArchiveStore) -> Self {
        let dialect = SqliteCalendar::new(store.time_basis());
        Self::with_dialect(store, dialect)
    }
}

impl<D: CalendarDialect> RecordResolver<D> {
    pub fn with_dialect(store: ArchiveStore, dialect: D) -> Self {
        Self {
            store,
            builder: QueryBuilder::new(dialect),
        }
    }

    /// Record for one calendar day (`month` name or number) across all years
    pub fn daily(
        &self,
        obs_type: &str,
        month: &str,
        day: u32,
        kind: AggregateKind,
    ) -> RecordResult<Option<Record>> {
        self.resolve(obs_type, &Window::day(month, day)?, kind)
    }

    /// Record for one month across all years
    pub fn monthly(
        &self,
        obs_type: &str,
        month: &str,
        kind: AggregateKind,
    ) -> RecordResult<Option<Record>> {
        self.resolve(obs_type, &Window::month(month)?, kind)
    }

    /// Record for one calendar year
    pub fn yearly(
        &self,
        obs_type: &str,
        year: i32,
        kind: AggregateKind,
    ) -> RecordResult<Option<Record>> {
        self.resolve(obs_type, &Window::year(year)?, kind)
    }

    /// Record over all recorded history
    pub fn all_time(&self, obs_type: &str, kind: AggregateKind) -> RecordResult<Option<Record>> {
        self.resolve(obs_type, &Window::AllTime, kind)
    }

    /// Resolve one record; `Ok(None)` when the window matched no rows
    pub fn resolve(
        &self,
        obs_type: &str,
        window: &Window,
        kind: AggregateKind,
    ) -> RecordResult<Option<Record>> {
        let conn = self.store.open_read_connection()?;
        let table = ArchiveStore::daily_table(&conn, obs_type)?;

        tracing::debug!(obs_type = %obs_type, %window, %kind, "Resolving record");
        self.resolve_on(&conn, &table, window, kind)
    }

    /// Resolve max, min and sum for one window over a single connection
    pub fn resolve_all(&self, obs_type: &str, window: &Window) -> RecordResult<RecordSet> {
        let conn = self.store.open_read_connection()?;
        let table = ArchiveStore::daily_table(&conn, obs_type)?;

        tracing::debug!(obs_type = %obs_type, %window, "Resolving record set");
        Ok(RecordSet {
            max: self.resolve_on(&conn, &table, window, AggregateKind::Max)?,
            min: self.resolve_on(&conn, &table, window, AggregateKind::Min)?,
            sum: self.resolve_on(&conn, &table, window, AggregateKind::Sum)?,
        })
    }

    fn resolve_on(
        &self,
        conn: &Connection,
        table: &str,
        window: &Window,
        kind: AggregateKind,
    ) -> RecordResult<Option<Record>> {
        let columns = kind.columns();
        let predicate = window.predicate();

        let record = match (window, kind) {
            (Window::Month { month }, AggregateKind::Max | AggregateKind::Min) => {
                MonthlyExtreme::new(&self.builder, table, *month)
                    .resolve(conn, columns, direction_of(kind))?
                    .map(|raw| Record::Extreme(ExtremeRecord::from_raw(raw)))
            }
            (Window::Month { month }, AggregateKind::Sum) => {
                let wettest_year = MonthlyExtreme::new(&self.builder, table, *month)
                    .wettest_year(conn, columns.value)?;
                let peak_day = self
                    .builder
                    .select_peak_day(conn, table, &predicate)?
                    .map(ExtremeRecord::from_raw);

                if wettest_year.is_none() && peak_day.is_none() {
                    None
                } else {
                    Some(Record::MonthlyTotal(MonthlyTotalRecord {
                        wettest_year,
                        peak_day,
                    }))
                }
            }
            (Window::Year { .. } | Window::AllTime, AggregateKind::Sum) => {
                match self
                    .builder
                    .select_sum(conn, table, columns.value, &predicate)?
                {
                    Some(total) => {
                        let peak_day = self
                            .builder
                            .select_peak_day(conn, table, &predicate)?
                            .map(ExtremeRecord::from_raw);
                        Some(Record::Total(TotalRecord { total, peak_day }))
                    }
                    None => None,
                }
            }
            // Day windows (every kind, Sum included) and Year/AllTime Max/Min
            // are a plain extreme search over the window's rows
            _ => self
                .builder
                .select_extreme(conn, table, columns, &predicate, direction_of(kind))?
                .map(|raw| Record::Extreme(ExtremeRecord::from_raw(raw))),
        };

        Ok(record)
    }
}

/// Search direction for a kind; a Sum extreme is the heaviest day
fn direction_of(kind: AggregateKind) -> Direction {
    match kind {
        AggregateKind::Min => Direction::Min,
        AggregateKind::Max | AggregateKind::Sum => Direction::Max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::error::RecordError;
    use crate::storage::testutil::ArchiveFixture;
    use crate::storage::{ArchiveOptions, StorageError};

    fn resolver(fixture: &ArchiveFixture) -> RecordResolver {
        RecordResolver::new(fixture.store())
    }

    fn iso(ts: i64) -> String {
        crate::storage::iso8601_utc(ts)
    }

    #[test]
    fn test_daily_max_reports_tied_years() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("outTemp", (2020, 7, 4), 70.0, 95.0, 0.0);
        fixture.add_day("outTemp", (2021, 7, 4), 68.0, 95.0, 0.0);
        fixture.add_day("outTemp", (2022, 7, 4), 66.0, 90.0, 0.0);

        let record = resolver(&fixture)
            .daily("outTemp", "July", 4, AggregateKind::Max)
            .unwrap()
            .unwrap();
        let extreme = record.as_extreme().unwrap();

        assert_eq!(extreme.value, 95.0);
        assert_eq!(
            extreme.times,
            vec!["2020-07-04T15:00:00Z", "2021-07-04T15:00:00Z"]
        );
    }

    #[test]
    fn test_daily_min_and_sum() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("rain", (2020, 3, 9), 0.0, 0.3, 1.2);
        fixture.add_day("rain", (2021, 3, 9), 0.0, 0.5, 2.4);
        fixture.add_day("rain", (2021, 3, 10), 0.0, 0.9, 5.0);
        let r = resolver(&fixture);

        let wettest = r
            .daily("rain", "march", 9, AggregateKind::Sum)
            .unwrap()
            .unwrap();
        let wettest = wettest.as_extreme().unwrap();
        assert_eq!(wettest.value, 2.4);
        assert_eq!(wettest.times, vec![iso(ArchiveFixture::day_start((2021, 3, 9)))]);

        let min = r
            .daily("rain", "3", 9, AggregateKind::Min)
            .unwrap()
            .unwrap();
        let min = min.as_extreme().unwrap();
        assert_eq!(min.value, 0.0);
        assert_eq!(min.times.len(), 2);
    }

    #[test]
    fn test_impossible_day_is_no_data() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("outTemp", (2020, 4, 30), 40.0, 70.0, 0.0);
        fixture.add_day("outTemp", (2020, 5, 1), 41.0, 71.0, 0.0);

        let r = resolver(&fixture);
        for kind in AggregateKind::ALL {
            assert_eq!(r.daily("outTemp", "April", 31, kind).unwrap(), None);
        }
        assert_eq!(
            r.daily("outTemp", "February", 30, AggregateKind::Max).unwrap(),
            None
        );
    }

    #[test]
    fn test_invalid_arguments() {
        let fixture = ArchiveFixture::new();
        fixture.add_daily_table("outTemp");
        let r = resolver(&fixture);

        assert!(matches!(
            r.daily("outTemp", "Julember", 4, AggregateKind::Max),
            Err(RecordError::InvalidArgument(_))
        ));
        assert!(matches!(
            r.daily("outTemp", "July", 40, AggregateKind::Max),
            Err(RecordError::InvalidArgument(_))
        ));
        assert!(matches!(
            r.yearly("outTemp", 0, AggregateKind::Sum),
            Err(RecordError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unknown_observation_type() {
        let fixture = ArchiveFixture::new();
        fixture.add_daily_table("outTemp");

        let result = resolver(&fixture).all_time("windGust", AggregateKind::Max);
        assert!(matches!(
            result,
            Err(RecordError::UnknownObservationType(ref o)) if o == "windGust"
        ));
    }

    #[test]
    fn test_missing_archive_is_storage_error() {
        let store = ArchiveStore::new(ArchiveOptions::new("/nonexistent/weewx.sdb"));
        let result = RecordResolver::new(store).all_time("outTemp", AggregateKind::Max);
        assert!(matches!(
            result,
            Err(RecordError::Storage(StorageError::Unavailable(_)))
        ));
    }

    #[test]
    fn test_malformed_daily_table_is_query_error() {
        let fixture = ArchiveFixture::new();
        rusqlite::Connection::open(&fixture.path)
            .unwrap()
            .execute_batch(
                "CREATE TABLE archive_day_outTemp (
                    dateTime INTEGER NOT NULL UNIQUE PRIMARY KEY,
                    min REAL, mintime INTEGER,
                    max REAL, maxtime INTEGER
                );
                INSERT INTO archive_day_outTemp VALUES (1593820800, 60.0, 1593842400, 95.0, 1593874800);",
            )
            .unwrap();
        let r = resolver(&fixture);

        let result = r.all_time("outTemp", AggregateKind::Sum);
        assert!(matches!(
            result,
            Err(RecordError::Storage(StorageError::Query(_)))
        ));

        let result = r.resolve_all("outTemp", &Window::month("July").unwrap());
        assert!(matches!(
            result,
            Err(RecordError::Storage(StorageError::Query(_)))
        ));

        let max = r.all_time("outTemp", AggregateKind::Max).unwrap().unwrap();
        assert_eq!(max.as_extreme().unwrap().value, 95.0);
    }

    #[test]
    fn test_monthly_max_two_days_same_month_tie() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("outTemp", (2021, 8, 10), 60.0, 99.0, 0.0);
        fixture.add_day("outTemp", (2021, 8, 11), 61.0, 99.0, 0.0);
        fixture.add_day("outTemp", (2021, 8, 12), 62.0, 91.0, 0.0);

        let record = resolver(&fixture)
            .monthly("outTemp", "August", AggregateKind::Max)
            .unwrap()
            .unwrap();
        let extreme = record.as_extreme().unwrap();
        assert_eq!(extreme.value, 99.0);
        assert_eq!(
            extreme.times,
            vec!["2021-08-10T15:00:00Z", "2021-08-11T15:00:00Z"]
        );
    }

    #[test]
    fn test_monthly_sum_wettest_year_and_peak_day() {
        let fixture = ArchiveFixture::new();
        // 2020: 31 days [10, 0, 5, 10 x 27, 15] totaling 300
        fixture.add_day("rain", (2020, 8, 1), 0.0, 0.0, 10.0);
        fixture.add_day("rain", (2020, 8, 2), 0.0, 0.0, 0.0);
        fixture.add_day("rain", (2020, 8, 3), 0.0, 0.0, 5.0);
        for day in 4..=31 {
            let sum = if day == 31 { 15.0 } else { 10.0 };
            fixture.add_day("rain", (2020, 8, day), 0.0, 0.0, sum);
        }
        // 2021: 25 days of 10 = 250
        for day in 1..=25 {
            fixture.add_day("rain", (2021, 8, day), 0.0, 0.0, 10.0);
        }

        let record = resolver(&fixture)
            .monthly("rain", "August", AggregateKind::Sum)
            .unwrap()
            .unwrap();
        let monthly = record.as_monthly_total().unwrap();

        let wettest = monthly.wettest_year.as_ref().unwrap();
        assert_eq!(wettest.total, 300.0);
        assert_eq!(wettest.years, vec![2020]);

        let peak = monthly.peak_day.as_ref().unwrap();
        assert_eq!(peak.value, 15.0);
        assert_eq!(peak.times, vec!["2020-08-31T00:00:00Z"]);
    }

    #[test]
    fn test_monthly_sum_no_data() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("rain", (2020, 8, 1), 0.0, 0.0, 1.0);

        let record = resolver(&fixture)
            .monthly("rain", "January", AggregateKind::Sum)
            .unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_yearly_records() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("rain", (2020, 5, 1), 0.0, 0.2, 1.0);
        fixture.add_day("rain", (2020, 6, 1), 0.0, 0.8, 4.0);
        fixture.add_day("rain", (2021, 6, 1), 0.0, 1.5, 9.0);
        let r = resolver(&fixture);

        let total = r.yearly("rain", 2020, AggregateKind::Sum).unwrap().unwrap();
        let total = total.as_total().unwrap();
        assert_eq!(total.total, 5.0);
        let peak = total.peak_day.as_ref().unwrap();
        assert_eq!(peak.value, 4.0);
        assert_eq!(peak.times, vec!["2020-06-01T00:00:00Z"]);

        let max = r.yearly("rain", 2020, AggregateKind::Max).unwrap().unwrap();
        assert_eq!(max.as_extreme().unwrap().value, 0.8);

        assert_eq!(r.yearly("rain", 1999, AggregateKind::Sum).unwrap(), None);
    }

    #[test]
    fn test_all_time_records() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("rain", (2019, 1, 1), 0.0, 0.2, 1.0);
        fixture.add_day("rain", (2020, 6, 1), 0.0, 0.8, 4.0);
        fixture.add_day("rain", (2021, 6, 1), 0.0, 1.5, 4.0);
        let r = resolver(&fixture);

        let total = r.all_time("rain", AggregateKind::Sum).unwrap().unwrap();
        let total = total.as_total().unwrap();
        assert_eq!(total.total, 9.0);
        assert_eq!(
            total.peak_day.as_ref().unwrap().times,
            vec!["2020-06-01T00:00:00Z", "2021-06-01T00:00:00Z"]
        );

        let min = r.all_time("rain", AggregateKind::Min).unwrap().unwrap();
        assert_eq!(min.as_extreme().unwrap().times.len(), 3);
    }

    #[test]
    fn test_all_time_on_empty_table_is_no_data() {
        let fixture = ArchiveFixture::new();
        fixture.add_daily_table("rain");

        let set = resolver(&fixture)
            .resolve_all("rain", &Window::AllTime)
            .unwrap();
        assert_eq!(set, RecordSet::default());
    }

    #[test]
    fn test_repeated_queries_are_identical() {
        let fixture = ArchiveFixture::new();
        fixture.add_day("outTemp", (2021, 7, 4), 68.0, 95.0, 0.0);
        fixture.add_day("outTemp", (2020, 7, 4), 70.0, 95.0, 0.0);
        fixture.add_day("outTemp", (2019, 7, 4), 66.0, 95.0, 0.0);
        let r = resolver(&fixture);
        let window = Window::day("July", 4).unwrap();

        let first = r.resolve_all("outTemp", &window).unwrap();
        let second = r.resolve_all("outTemp", &window).unwrap();
        assert_eq!(first, second);

        let times = &first.max.as_ref().unwrap().as_extreme().unwrap().times;
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, &sorted);
    }

    #[test]
    fn test_extreme_matches_brute_force() {
        let fixture = ArchiveFixture::new();
        let days = [
            ((2018, 2, 3), 12.5),
            ((2019, 2, 14), 18.0),
            ((2019, 3, 1), 25.0),
            ((2020, 2, 14), 18.0),
            ((2021, 2, 27), 17.9),
        ];
        for (date, max) in days {
            fixture.add_day("outTemp", date, max - 10.0, max, 0.0);
        }

        let record = resolver(&fixture)
            .monthly("outTemp", "February", AggregateKind::Max)
            .unwrap()
            .unwrap();
        let extreme = record.as_extreme().unwrap();

        let february: Vec<_> = days.iter().filter(|(d, _)| d.1 == 2).collect();
        let expected_max = february.iter().map(|(_, v)| *v).fold(f64::MIN, f64::max);
        let mut expected_times: Vec<String> = february
            .iter()
            .filter(|(_, v)| *v == expected_max)
            .map(|(d, _)| iso(ArchiveFixture::max_time(*d)))
            .collect();
        expected_times.sort();

        assert_eq!(extreme.value, expected_max);
        assert_eq!(extreme.times, expected_times);
    }
}
