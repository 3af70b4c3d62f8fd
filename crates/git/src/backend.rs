//! The git-backed assets service: upload, stats, and lifecycle.

use crate::analyze::Analyzer;
use crate::branch::BranchManager;
use crate::client::GitClient;
use crate::error::UploadError;
use crate::pipeline::CommitPipeline;
use crate::queue::TaskQueue;
use crate::scheduler::Scheduler;
use crate::staging::Staging;
use crate::REMOTE_NAME;
use relink_core::config::{FetchConfig, RepoConfig};
use relink_core::{BranchId, FileDescriptor};
use relink_metadata::{AssetStats, MetadataStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The produced capability: re-host a URL, report stats, start/stop the
/// scheduler.
pub struct GitBackend {
    repo_config: RepoConfig,
    fetch_config: FetchConfig,
    queue: Arc<TaskQueue>,
    metadata: Arc<dyn MetadataStore>,
    git: Arc<dyn GitClient>,
    branches: Arc<BranchManager>,
    staging: Staging,
    analyzer: Analyzer,
    scheduler: Arc<Scheduler>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl GitBackend {
    /// Wire up the backend. No I/O happens until [`GitBackend::start`].
    pub fn new(
        repo_config: RepoConfig,
        fetch_config: FetchConfig,
        metadata: Arc<dyn MetadataStore>,
        git: Arc<dyn GitClient>,
    ) -> Result<Self, UploadError> {
        let staging = Staging::new(&repo_config.temp_dir, &repo_config.base_dir);
        let queue = Arc::new(TaskQueue::new());
        let branches = Arc::new(BranchManager::new(
            Arc::clone(&git),
            Arc::clone(&metadata),
            repo_config.max_branch_size,
        ));
        let pipeline = CommitPipeline::new(
            Arc::clone(&git),
            Arc::clone(&metadata),
            staging.clone(),
            repo_config.remote.clone(),
        );
        let scheduler = Arc::new(Scheduler::new(
            Arc::clone(&queue),
            Arc::clone(&branches),
            pipeline,
        ));
        let analyzer = Analyzer::new(&fetch_config)?;

        Ok(Self {
            repo_config,
            fetch_config,
            queue,
            metadata,
            git,
            branches,
            staging,
            analyzer,
            scheduler,
            cancel: CancellationToken::new(),
            worker: Mutex::new(None),
        })
    }

    /// One-time repository initialization, idempotent across restarts.
    ///
    /// Creates the local clone when absent; afterwards checks out the
    /// active branch synchronized with the remote, so a restart never
    /// publishes over stale local state.
    async fn init_repo(&self) -> Result<(), UploadError> {
        if !self.repo_config.base_dir.join(".git").exists() {
            tracing::info!(
                dir = %self.repo_config.base_dir.display(),
                "initializing repository"
            );
            self.git.init().await?;
            self.git
                .add_remote(REMOTE_NAME, &self.repo_config.remote.push_url())
                .await?;
        }
        self.branches.checkout(false, true).await?;
        Ok(())
    }

    /// Initialize the repository and start the scheduler.
    ///
    /// An initialization failure is fatal: the scheduler is never spawned.
    pub async fn start(&self) -> Result<(), UploadError> {
        self.staging.init().await?;
        self.init_repo().await?;

        let scheduler = Arc::clone(&self.scheduler);
        let interval = self.repo_config.flush_interval();
        let cancel = self.cancel.clone();
        let handle = tokio::spawn(async move { scheduler.run(interval, cancel).await });
        *self.worker.lock().await = Some(handle);

        tracing::info!(
            flush_interval_ms = self.repo_config.flush_interval_ms,
            max_branch_size = self.repo_config.max_branch_size,
            "git backend started"
        );
        Ok(())
    }

    /// Stop the scheduler.
    ///
    /// An in-flight publish runs to completion; pending-but-unclaimed
    /// tasks simply stop making progress and are not failed.
    pub async fn stop(&self) {
        self.cancel.cancel();
        if let Some(handle) = self.worker.lock().await.take() {
            if let Err(err) = handle.await {
                tracing::error!(error = ?err, "scheduler task did not shut down cleanly");
            }
        }
    }

    /// Re-host a source URL, returning its durable public URL.
    ///
    /// Whitelisted URLs are returned unchanged. A hash already persisted
    /// resolves immediately from the metadata store without touching the
    /// queue. Everything else is staged and enqueued; the call suspends
    /// until a batch containing the upload publishes (or fails).
    pub async fn upload(&self, url: &str, name_hint: Option<&str>) -> Result<String, UploadError> {
        if self
            .fetch_config
            .whitelist
            .iter()
            .any(|prefix| url.starts_with(prefix.as_str()))
        {
            return Ok(url.to_string());
        }

        let analyzed = self.analyzer.analyze(url, name_hint).await?;
        let hash_hex = analyzed.hash.to_hex();

        if let Some(row) = self.metadata.get_by_hash(&hash_hex).await? {
            let branch_name = BranchId::new(row.branch.max(0) as u64).to_name();
            let filename = format!("{}{}", row.hash, row.name);
            return Ok(self
                .repo_config
                .remote
                .public_url(&branch_name, &filename));
        }

        let temp_path = self
            .staging
            .write_temp(&analyzed.hash, &analyzed.bytes)
            .await?;
        let receiver = self.queue.enqueue(FileDescriptor {
            hash: analyzed.hash,
            name: analyzed.name,
            size: analyzed.bytes.len() as u64,
            temp_path,
        });
        receiver.await.map_err(|_| UploadError::Stopped)?
    }

    /// Aggregate statistics over everything published.
    ///
    /// Reflects persisted truth only; never affected by queue state.
    pub async fn stats(&self) -> Result<AssetStats, UploadError> {
        Ok(self.metadata.stats().await?)
    }

    /// The queue, exposed for tests driving the scheduler directly.
    pub fn queue(&self) -> &Arc<TaskQueue> {
        &self.queue
    }

    /// The scheduler, exposed for tests flushing deterministically.
    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    /// The staging area.
    pub fn staging(&self) -> &Staging {
        &self.staging
    }
}
