//! Weather Records Engine
//!
//! Computes record extremes and totals from the daily summary tables:
//!
//! - **window**: Window descriptors, aggregate kinds, month parsing
//! - **calendar**: Calendar-field extraction behind a dialect trait
//! - **builder**: Aggregate SQL and tie-preserving extreme search
//! - **monthly**: Two-level per-year reductions for monthly records
//! - **resolver**: Per-window composition into record results
//! - **result**: Record result shapes
//!
//! # Pipeline
//!
//! ```text
//! (obs, Window, AggregateKind)
//!        ↓
//! RecordResolver → which sub-queries does this window need?
//!        ↓
//! QueryBuilder   → extreme + ties / sum / per-year aggregates
//!        ↓
//! ExtremeRecord / TotalRecord / MonthlyTotalRecord (times ISO-8601 UTC, ascending)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use wxarchive::records::{AggregateKind, RecordResolver};
//! use wxarchive::storage::{ArchiveOptions, ArchiveStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ArchiveStore::new(ArchiveOptions::new("/var/lib/weewx/weewx.sdb"));
//!     let resolver = RecordResolver::new(store);
//!
//!     // Hottest July 4th on record, every year that reached it
//!     if let Some(record) = resolver.daily("outTemp", "July", 4, AggregateKind::Max)? {
//!         println!("{:?}", record);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod builder;
mod calendar;
mod error;
mod monthly;
mod resolver;
mod result;
mod window;

pub use builder::{AggregateQuery, QueryBuilder, RawExtreme, YearAggregate};
pub use calendar::{CalendarDialect, CalendarField, SqlFilter, SqliteCalendar};
pub use error::{RecordError, RecordResult};
pub use monthly::{reduce_across_years, MonthlyExtreme, YearReduction};
pub use resolver::RecordResolver;
pub use result::{ExtremeRecord, MonthlyTotalRecord, Record, RecordSet, TotalRecord, YearTotal};
pub use window::{parse_month, AggregateKind, CalendarPredicate, Direction, SummaryColumns, Window};
