//! On-disk archive fixtures for tests

use chrono::{NaiveDate, TimeZone, Utc};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

use crate::storage::{ArchiveOptions, ArchiveStore, TimeBasis};

/// A temporary weewx-style archive with `outTemp` and `rain` columns
pub struct ArchiveFixture {
    _dir: TempDir,
    pub path: PathBuf,
}

impl ArchiveFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weewx.sdb");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE archive (
                dateTime INTEGER NOT NULL UNIQUE PRIMARY KEY,
                usUnits INTEGER NOT NULL,
                interval INTEGER NOT NULL,
                outTemp REAL,
                rain REAL
            );",
        )
        .unwrap();
        Self { _dir: dir, path }
    }

    /// A UTC-basis store over this fixture
    pub fn store(&self) -> ArchiveStore {
        ArchiveStore::new(ArchiveOptions::new(&self.path).time_basis(TimeBasis::Utc))
    }

    fn conn(&self) -> Connection {
        Connection::open(&self.path).unwrap()
    }

    pub fn add_sample(&self, timestamp: i64, values: &[(&str, Option<f64>)]) {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO archive (dateTime, usUnits, interval) VALUES (?1, 1, 5)",
            params![timestamp],
        )
        .unwrap();
        for (column, value) in values {
            let sql = format!("UPDATE archive SET {} = ?1 WHERE dateTime = ?2", column);
            conn.execute(&sql, params![value, timestamp]).unwrap();
        }
    }

    fn ensure_daily_table(conn: &Connection, obs_type: &str) {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS archive_day_{} (
                dateTime INTEGER NOT NULL UNIQUE PRIMARY KEY,
                min REAL, mintime INTEGER,
                max REAL, maxtime INTEGER,
                sum REAL, count INTEGER,
                wsum REAL, sumtime INTEGER
            )",
            obs_type
        );
        conn.execute(&sql, []).unwrap();
    }

    /// Midnight UTC of a calendar date
    pub fn day_start((year, month, day): (i32, u32, u32)) -> i64 {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
            .timestamp()
    }

    /// Time the fixture records for a day's minimum (06:00 UTC)
    pub fn min_time(date: (i32, u32, u32)) -> i64 {
        Self::day_start(date) + 6 * 3600
    }

    /// Time the fixture records for a day's maximum (15:00 UTC)
    pub fn max_time(date: (i32, u32, u32)) -> i64 {
        Self::day_start(date) + 15 * 3600
    }

    /// Insert one daily summary row
    pub fn add_day(&self, obs_type: &str, date: (i32, u32, u32), min: f64, max: f64, sum: f64) {
        self.add_day_values(obs_type, date, Some(min), Some(max), Some(sum));
    }

    pub fn add_day_values(
        &self,
        obs_type: &str,
        date: (i32, u32, u32),
        min: Option<f64>,
        max: Option<f64>,
        sum: Option<f64>,
    ) {
        let conn = self.conn();
        Self::ensure_daily_table(&conn, obs_type);
        let sql = format!(
            "INSERT INTO archive_day_{} (dateTime, min, mintime, max, maxtime, sum, count, wsum, sumtime)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 288, 0, 0)",
            obs_type
        );
        conn.execute(
            &sql,
            params![
                Self::day_start(date),
                min,
                min.map(|_| Self::min_time(date)),
                max,
                max.map(|_| Self::max_time(date)),
                sum
            ],
        )
        .unwrap();
    }

    /// Create an empty daily summary table
    pub fn add_daily_table(&self, obs_type: &str) {
        Self::ensure_daily_table(&self.conn(), obs_type);
    }
}
