//! wxarchive API Server
//!
//! Serves records, archive statistics and climate normals over HTTP.
//!
//! Configuration is read from the first `config.toml` found in the user
//! config directory, `/etc/wxarchive/` or the working directory, then
//! overridden by `WXARCHIVE_*` environment variables. `RUST_LOG` takes
//! precedence over the configured log level.

use std::path::Path;

use wxarchive::api::{serve, AppState};
use wxarchive::config::{Config, LoggingConfig};
use wxarchive::normals::NormalsStore;
use wxarchive::storage::ArchiveStore;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting wxarchive API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Archive database: {}", config.archive.db_path);
    tracing::info!("Calendar time basis: {}", config.archive.time_basis);

    if !Path::new(&config.archive.db_path).exists() {
        tracing::warn!(
            "Archive database {} does not exist yet; queries will fail until it does",
            config.archive.db_path
        );
    }

    let store = ArchiveStore::new(config.archive.options());
    let mut state = AppState::new(store, config.api.clone());

    match config.normals.active_path() {
        Some(path) => match NormalsStore::load(&path) {
            Ok(normals) => {
                tracing::info!("Loaded climate normals from {:?}", path);
                state = state.with_normals(normals);
            }
            Err(e) => tracing::warn!("Climate normals unavailable: {}", e),
        },
        None => tracing::info!("Climate normals disabled"),
    }

    serve(state, &config.api).await?;

    tracing::info!("wxarchive API server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "wxarchive={},tower_http={}",
            logging.level, logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
