//! Weather Archive Storage
//!
//! Read-only access to a weewx-style SQLite archive:
//!
//! - **types**: Shared data structures (TimeBasis, TimeSpan, Observation, ...)
//! - **archive**: Connection factory and raw-sample queries
//! - **error**: Error types
//!
//! # Layout
//!
//! ```text
//! archive              dateTime | usUnits | interval | outTemp | rain | ...
//! archive_day_outTemp  dateTime | min | minTime | max | maxTime | sum | ...
//! archive_day_rain     dateTime | min | minTime | max | maxTime | sum | ...
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use wxarchive::storage::{ArchiveOptions, ArchiveStore, TimeBasis, TimeSpan};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ArchiveStore::new(
//!         ArchiveOptions::new("/var/lib/weewx/weewx.sdb").time_basis(TimeBasis::Local),
//!     );
//!
//!     let stats = store.stats("outTemp", TimeSpan::all())?;
//!     println!("max outTemp: {:?}", stats.max);
//!
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod error;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use archive::{ArchiveOptions, ArchiveStore, DAILY_TABLE_PREFIX};
pub use error::{StorageError, StorageResult};
pub use types::{
    iso8601_utc, BinFunction, ColumnInfo, Observation, ObservationStats, PeriodOfRecord,
    TimeBasis, TimeSpan,
};
