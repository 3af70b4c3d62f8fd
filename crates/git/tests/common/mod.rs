//! Shared fixtures for pipeline integration tests.

pub mod memory;
pub mod mocks;

use memory::MemoryStore;
use mocks::MockGit;
use relink_core::config::RemoteConfig;
use relink_core::{ContentHash, FileDescriptor};
use relink_git::{
    BranchManager, CommitPipeline, GitClient, Scheduler, Staging, TaskQueue,
};
use relink_metadata::MetadataStore;
use std::sync::Arc;
use tempfile::TempDir;

/// A fully wired pipeline over in-memory fakes.
pub struct Harness {
    pub temp: TempDir,
    pub queue: Arc<TaskQueue>,
    pub scheduler: Arc<Scheduler>,
    pub store: Arc<MemoryStore>,
    pub git: Arc<MockGit>,
    pub staging: Staging,
    pub remote: RemoteConfig,
}

/// Build a pipeline with the given branch capacity ceiling.
pub async fn harness(max_branch_size: u64) -> Harness {
    let temp = tempfile::tempdir().unwrap();
    let staging = Staging::new(temp.path().join("staging"), temp.path().join("repo"));
    staging.init().await.unwrap();

    let store = Arc::new(MemoryStore::new());
    let git = Arc::new(MockGit::new());
    let remote = RemoteConfig {
        owner: "alice".to_string(),
        repo: "assets".to_string(),
        token: "secret".to_string(),
        cdn_base: "https://cdn.jsdelivr.net/gh".to_string(),
    };

    let queue = Arc::new(TaskQueue::new());
    let branches = Arc::new(BranchManager::new(
        Arc::clone(&git) as Arc<dyn GitClient>,
        Arc::clone(&store) as Arc<dyn MetadataStore>,
        max_branch_size,
    ));
    let pipeline = CommitPipeline::new(
        Arc::clone(&git) as Arc<dyn GitClient>,
        Arc::clone(&store) as Arc<dyn MetadataStore>,
        staging.clone(),
        remote.clone(),
    );
    let scheduler = Arc::new(Scheduler::new(Arc::clone(&queue), branches, pipeline));

    Harness {
        temp,
        queue,
        scheduler,
        store,
        git,
        staging,
        remote,
    }
}

/// Stage `data` and build the descriptor the analyzer would produce.
pub async fn stage_file(staging: &Staging, data: &[u8], name: &str) -> FileDescriptor {
    let hash = ContentHash::compute(data);
    let temp_path = staging.write_temp(&hash, data).await.unwrap();
    FileDescriptor {
        hash,
        name: name.to_string(),
        size: data.len() as u64,
        temp_path,
    }
}
