//! # wxarchive
//!
//! Weather records and statistics over a weewx-style SQLite archive.
//!
//! ## Features
//!
//! - **Records**: daily, monthly, yearly and all-time max/min/sum records
//!   with every tying occurrence reported
//! - **Archive queries**: period of record, raw samples, summary statistics
//!   and fixed-width binned aggregates
//! - **Climate normals**: daily and monthly normals from a JSON document
//! - **REST API**: Axum server exposing all of the above
//!
//! ## Modules
//!
//! - [`storage`]: Read-only access to the archive database
//! - [`records`]: Query builder and record resolver
//! - [`normals`]: Climate normals lookups
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wxarchive::records::{RecordResolver, Window};
//! use wxarchive::storage::{ArchiveOptions, ArchiveStore, TimeBasis};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ArchiveStore::new(
//!         ArchiveOptions::new("/var/lib/weewx/weewx.sdb").time_basis(TimeBasis::Local),
//!     );
//!     let resolver = RecordResolver::new(store);
//!
//!     let records = resolver.resolve_all("rain", &Window::month("June")?)?;
//!     println!("{}", serde_json::to_string_pretty(&records)?);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod normals;
pub mod records;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{ArchiveOptions, ArchiveStore, StorageError, StorageResult, TimeBasis, TimeSpan};

pub use records::{
    AggregateKind, Record, RecordError, RecordResolver, RecordResult, RecordSet, Window,
};

pub use normals::{Normals, NormalsError, NormalsStore};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError};
