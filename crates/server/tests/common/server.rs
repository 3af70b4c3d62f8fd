//! Server test utilities.

use super::mocks::MockGit;
use relink_core::config::AppConfig;
use relink_git::{GitBackend, GitClient};
use relink_metadata::MetadataStore;
use relink_server::{create_router, AppState};
use std::sync::Arc;
use tempfile::TempDir;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub git: Arc<MockGit>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let mut config = AppConfig::for_testing(temp_dir.path());
        modifier(&mut config);

        let metadata: Arc<dyn MetadataStore> = relink_metadata::from_config(&config.metadata)
            .await
            .expect("Failed to create metadata store");

        let git = Arc::new(MockGit::new());
        let backend = Arc::new(
            GitBackend::new(
                config.repo.clone(),
                config.fetch.clone(),
                metadata.clone(),
                Arc::clone(&git) as Arc<dyn GitClient>,
            )
            .expect("Failed to wire backend"),
        );
        backend.start().await.expect("Failed to start backend");

        let state = AppState::new(config, backend, metadata);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            git,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying metadata store.
    pub fn metadata(&self) -> Arc<dyn MetadataStore> {
        self.state.metadata.clone()
    }
}
