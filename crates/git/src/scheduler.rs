//! Single-worker polling loop draining the task queue.
//!
//! At most one publish is in flight at any time, so the working tree,
//! branch state, and remote are never mutated concurrently. Enqueues made
//! while a publish runs are picked up on the next iteration.

use crate::branch::BranchManager;
use crate::error::UploadError;
use crate::pipeline::CommitPipeline;
use crate::queue::TaskQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The scheduler owning one flush cycle: checkout, claim, publish.
pub struct Scheduler {
    queue: Arc<TaskQueue>,
    branches: Arc<BranchManager>,
    pipeline: CommitPipeline,
}

impl Scheduler {
    /// Create a scheduler over the given queue and collaborators.
    pub fn new(
        queue: Arc<TaskQueue>,
        branches: Arc<BranchManager>,
        pipeline: CommitPipeline,
    ) -> Self {
        Self {
            queue,
            branches,
            pipeline,
        }
    }

    /// Run one flush cycle.
    ///
    /// Checks out the active branch and claims a batch against its
    /// remaining capacity. An empty claim means the current branch cannot
    /// fit even the first pending task: rotate to a fresh branch and claim
    /// against full capacity, this time accepting an oversized head task
    /// so a file larger than the ceiling gets a dedicated branch instead
    /// of starving.
    pub async fn flush_once(&self) -> Result<(), UploadError> {
        let ceiling = self.branches.max_branch_size();

        let mut branch = self.branches.checkout(false, false).await?;
        let mut batch = self.queue.claim_batch(branch.remaining(ceiling), false);
        if batch.is_empty() {
            branch = self.branches.checkout(true, false).await?;
            batch = self.queue.claim_batch(ceiling, true);
        }
        if batch.is_empty() {
            return Ok(());
        }

        tracing::debug!(files = batch.len(), branch = %branch.id, "flushing batch");
        self.pipeline.publish(&self.queue, &batch, branch).await;
        Ok(())
    }

    /// Run the polling loop until cancelled.
    ///
    /// An empty queue suspends for one poll interval (the sleep itself is
    /// cancellable). A failing iteration is logged and the loop continues:
    /// a bad batch never halts processing of subsequent ones. Cancellation
    /// lets an in-flight publish finish and leaves unclaimed tasks pending.
    pub async fn run(&self, interval: Duration, cancel: CancellationToken) {
        loop {
            if cancel.is_cancelled() {
                break;
            }
            if self.queue.is_empty() {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
                continue;
            }
            if let Err(err) = self.flush_once().await {
                tracing::warn!(error = %err, "flush iteration failed");
            }
        }
        tracing::debug!("scheduler stopped");
    }
}
