//! Application state shared across handlers.

use relink_core::config::AppConfig;
use relink_git::GitBackend;
use relink_metadata::MetadataStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The upload backend.
    pub backend: Arc<GitBackend>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        backend: Arc<GitBackend>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            metadata,
        }
    }
}
