//! The atomic commit-and-publish step.
//!
//! A claimed batch passes through move, stage, commit, push, and insert,
//! each step gated on the previous one. The metadata row is the caller's
//! proof of publication, so it is written only after the push succeeds: a
//! push failure leaves the store untouched, and the partially written git
//! branch is overwritten by a future forced push or rotation.

use crate::client::GitClient;
use crate::error::UploadError;
use crate::queue::{Task, TaskQueue};
use crate::staging::Staging;
use crate::REMOTE_NAME;
use relink_core::config::RemoteConfig;
use relink_core::Branch;
use relink_metadata::models::NewAsset;
use relink_metadata::MetadataStore;
use std::sync::Arc;

/// Publishes one claimed batch at a time.
pub struct CommitPipeline {
    git: Arc<dyn GitClient>,
    metadata: Arc<dyn MetadataStore>,
    staging: Staging,
    remote: RemoteConfig,
}

impl CommitPipeline {
    /// Create a pipeline publishing through the given collaborators.
    pub fn new(
        git: Arc<dyn GitClient>,
        metadata: Arc<dyn MetadataStore>,
        staging: Staging,
        remote: RemoteConfig,
    ) -> Self {
        Self {
            git,
            metadata,
            staging,
            remote,
        }
    }

    /// The public URL a task resolves to once published on `branch`.
    pub fn public_url(&self, branch_name: &str, filename: &str) -> String {
        self.remote.public_url(branch_name, filename)
    }

    /// Publish a batch to the given branch and settle every waiter.
    ///
    /// All-or-nothing per batch: any failing step rejects every waiter with
    /// the same error. The batch's tasks are evicted from the live index in
    /// every outcome, before waiters are settled, so a failed hash can be
    /// retried fresh by a later request.
    pub async fn publish(&self, queue: &TaskQueue, batch: &[Arc<Task>], branch: Branch) {
        let outcome = self.try_publish(batch, branch).await;
        queue.finish_batch(batch);

        match outcome {
            Ok(()) => {
                let name = branch.id.to_name();
                for task in batch {
                    let url = self.public_url(&name, &task.descriptor.filename());
                    task.resolve(&url);
                }
                tracing::debug!(
                    branch = %name,
                    files = batch.len(),
                    "published batch"
                );
            }
            Err(err) => {
                tracing::warn!(
                    branch = %branch.id,
                    files = batch.len(),
                    error = %err,
                    "batch publish failed"
                );
                for task in batch {
                    task.reject(&err);
                }
            }
        }
    }

    async fn try_publish(&self, batch: &[Arc<Task>], branch: Branch) -> Result<(), UploadError> {
        let name = branch.id.to_name();

        let mut filenames = Vec::with_capacity(batch.len());
        for task in batch {
            let filename = task.descriptor.filename();
            self.staging
                .move_into_place(&task.descriptor.temp_path, &filename)
                .await?;
            filenames.push(filename);
        }

        self.git.stage(&filenames).await?;
        self.git.commit("upload").await?;
        self.git.push(REMOTE_NAME, &name, true).await?;

        // Only now is the publish target reachable; record it.
        let rows: Vec<NewAsset> = batch
            .iter()
            .map(|task| NewAsset {
                hash: task.descriptor.hash.to_hex(),
                name: task.descriptor.name.clone(),
                branch: branch.id.as_u64() as i64,
                size: task.descriptor.size as i64,
            })
            .collect();
        self.metadata.insert_batch(&rows).await?;

        Ok(())
    }
}
