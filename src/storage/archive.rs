//! Archive Store - read-only access to a weewx SQLite archive
//!
//! Every call opens its own connection, runs its statements in autocommit
//! mode and drops the connection before returning. SQLite serializes writers
//! but allows concurrent readers, so any number of requests may read while the
//! station keeps appending.
//!
//! # Tables
//! - `archive`: one row per sample, `dateTime` plus one column per observation type
//! - `archive_day_<obs>`: one row per calendar day with `min, minTime, max, maxTime, sum`

use rusqlite::{params_from_iter, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{
    is_identifier, BinFunction, ColumnInfo, Observation, ObservationStats, PeriodOfRecord,
    TimeBasis, TimeSpan,
};

/// Prefix of the per-observation daily summary tables
pub const DAILY_TABLE_PREFIX: &str = "archive_day_";

/// How an archive is opened
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Path to the SQLite database file
    pub path: PathBuf,
    /// Time zone of the archive's day boundaries
    pub time_basis: TimeBasis,
    /// How long a reader waits on a locked database
    pub busy_timeout: Duration,
}

impl ArchiveOptions {
    /// Options with the default basis (local) and a 5 second busy timeout
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            time_basis: TimeBasis::default(),
            busy_timeout: Duration::from_millis(5000),
        }
    }

    /// Builder method: set the time basis
    pub fn time_basis(mut self, basis: TimeBasis) -> Self {
        self.time_basis = basis;
        self
    }

    /// Builder method: set the busy timeout
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

/// Read-only handle factory for one archive database
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    options: ArchiveOptions,
}

impl ArchiveStore {
    pub fn new(options: ArchiveOptions) -> Self {
        Self { options }
    }

    /// Get the database path
    pub fn path(&self) -> &Path {
        &self.options.path
    }

    /// Get the archive's time basis
    pub fn time_basis(&self) -> TimeBasis {
        self.options.time_basis
    }

    /// Open a fresh read-only connection
    ///
    /// Fails with `Unavailable` if the file is missing or cannot be opened.
    pub fn open_read_connection(&self) -> StorageResult<Connection> {
        let path = &self.options.path;
        if !path.is_file() {
            return Err(StorageError::Unavailable(format!(
                "archive database not found at {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StorageError::Unavailable(format!("{}: {}", path.display(), e)))?;

        conn.busy_timeout(self.options.busy_timeout)?;

        Ok(conn)
    }

    /// Resolve the daily summary table for an observation type
    ///
    /// Returns the table name, or `UnknownObservationType` if it was never
    /// materialized.
    pub fn daily_table(conn: &Connection, obs_type: &str) -> StorageResult<String> {
        if !is_identifier(obs_type) {
            return Err(StorageError::InvalidArgument(format!(
                "'{}' is not a valid observation type name",
                obs_type
            )));
        }

        let table = format!("{}{}", DAILY_TABLE_PREFIX, obs_type);
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [&table],
            |row| row.get(0),
        )?;

        if exists == 0 {
            return Err(StorageError::UnknownObservationType(obs_type.to_string()));
        }

        Ok(table)
    }

    /// List the archive's columns and their declared types
    pub fn observation_types(&self) -> StorageResult<Vec<ColumnInfo>> {
        let conn = self.open_read_connection()?;
        Self::archive_columns(&conn)
    }

    /// Declared SQL type of one archive column, `None` if there is no such column
    pub fn datatype(&self, obs_type: &str) -> StorageResult<Option<String>> {
        let columns = self.observation_types()?;
        Ok(columns
            .into_iter()
            .find(|c| c.name == obs_type)
            .map(|c| c.sql_type))
    }

    /// First and last archive timestamps, `None` on an empty archive
    pub fn period_of_record(&self) -> StorageResult<Option<PeriodOfRecord>> {
        let conn = self.open_read_connection()?;
        let (first, last): (Option<i64>, Option<i64>) = conn.query_row(
            "SELECT MIN(dateTime), MAX(dateTime) FROM archive",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(match (first, last) {
            (Some(first), Some(last)) => Some(PeriodOfRecord::from_bounds(first, last)),
            _ => None,
        })
    }

    /// All samples of one observation type within a span, oldest first
    pub fn series(&self, obs_type: &str, span: TimeSpan) -> StorageResult<Vec<Observation>> {
        let conn = self.open_read_connection()?;
        let column = Self::archive_column(&conn, obs_type)?;
        let (clause, params) = span.where_clause();

        let sql = format!(
            "SELECT dateTime, {} FROM archive {} ORDER BY dateTime",
            column, clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                Ok(Observation {
                    timestamp: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(obs_type = %obs_type, rows = rows.len(), "Fetched archive series");
        Ok(rows)
    }

    /// Most recent sample of one observation type
    pub fn latest(&self, obs_type: &str) -> StorageResult<Option<Observation>> {
        let conn = self.open_read_connection()?;
        let column = Self::archive_column(&conn, obs_type)?;

        let sql = format!(
            "SELECT dateTime, {} FROM archive ORDER BY dateTime DESC LIMIT 1",
            column
        );
        let latest = conn
            .query_row(&sql, [], |row| {
                Ok(Observation {
                    timestamp: row.get(0)?,
                    value: row.get(1)?,
                })
            })
            .optional()?;

        Ok(latest)
    }

    /// Min, max, mean, total and count of one observation type within a span
    pub fn stats(&self, obs_type: &str, span: TimeSpan) -> StorageResult<ObservationStats> {
        let conn = self.open_read_connection()?;
        let column = Self::archive_column(&conn, obs_type)?;
        let (clause, params) = span.where_clause();

        let sql = format!(
            "SELECT MIN({c}), MAX({c}), AVG({c}), SUM({c}), COUNT({c}) FROM archive {w}",
            c = column,
            w = clause
        );
        let stats = conn.query_row(&sql, params_from_iter(params), |row| {
            Ok(ObservationStats {
                min: row.get(0)?,
                max: row.get(1)?,
                avg: row.get(2)?,
                sum: row.get(3)?,
                count: row.get::<_, i64>(4)? as u64,
            })
        })?;

        Ok(stats)
    }

    /// Aggregate samples into fixed-width bins of `bin_seconds`
    ///
    /// Each row carries the first timestamp that fell into its bin.
    pub fn aggregate(
        &self,
        obs_type: &str,
        span: TimeSpan,
        function: BinFunction,
        bin_seconds: i64,
    ) -> StorageResult<Vec<Observation>> {
        if bin_seconds <= 0 {
            return Err(StorageError::InvalidArgument(
                "bin size must be greater than 0".to_string(),
            ));
        }

        let conn = self.open_read_connection()?;
        let column = Self::archive_column(&conn, obs_type)?;
        let (clause, mut params) = span.where_clause();
        params.push(bin_seconds);

        let sql = format!(
            "SELECT MIN(dateTime), {f}({c}) FROM archive {w} GROUP BY dateTime / ? ORDER BY 1",
            f = function.sql(),
            c = column,
            w = clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                Ok(Observation {
                    timestamp: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn archive_columns(conn: &Connection) -> StorageResult<Vec<ColumnInfo>> {
        let mut stmt = conn.prepare("PRAGMA table_info(archive)")?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get(1)?,
                    sql_type: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Validate an observation type against the archive's columns
    fn archive_column(conn: &Connection, obs_type: &str) -> StorageResult<String> {
        if !is_identifier(obs_type) {
            return Err(StorageError::InvalidArgument(format!(
                "'{}' is not a valid observation type name",
                obs_type
            )));
        }

        let known = Self::archive_columns(conn)?
            .iter()
            .any(|c| c.name == obs_type);
        if !known {
            return Err(StorageError::UnknownObservationType(obs_type.to_string()));
        }

        Ok(obs_type.to_string())
    }
}
