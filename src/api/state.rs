//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::normals::NormalsStore;
use crate::records::RecordResolver;
use crate::storage::ArchiveStore;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Archive handle factory for raw-sample queries
    pub store: ArchiveStore,
    /// Record resolver over the same archive
    pub resolver: Arc<RecordResolver>,
    /// Climate normals, when configured
    pub normals: Option<Arc<NormalsStore>>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState without climate normals
    pub fn new(store: ArchiveStore, config: ApiConfig) -> Self {
        Self {
            resolver: Arc::new(RecordResolver::new(store.clone())),
            store,
            normals: None,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Builder method: serve climate normals
    pub fn with_normals(mut self, normals: NormalsStore) -> Self {
        self.normals = Some(Arc::new(normals));
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
