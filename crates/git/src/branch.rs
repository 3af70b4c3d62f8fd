//! Branch selection and rotation.
//!
//! The active branch is derived from the most recently persisted asset row,
//! and its accumulated size is recomputed with a live aggregate query on
//! every selection. An in-memory counter would drift after a crash between
//! push and insert; persisted rows cannot.

use crate::client::GitClient;
use crate::error::UploadError;
use crate::REMOTE_NAME;
use relink_core::{Branch, BranchId};
use relink_metadata::MetadataStore;
use std::sync::Arc;

/// Decides which capacity unit new files are assigned to and realizes the
/// decision against the version-control client.
pub struct BranchManager {
    git: Arc<dyn GitClient>,
    metadata: Arc<dyn MetadataStore>,
    max_branch_size: u64,
}

impl BranchManager {
    /// Create a manager enforcing the given branch capacity ceiling.
    pub fn new(
        git: Arc<dyn GitClient>,
        metadata: Arc<dyn MetadataStore>,
        max_branch_size: u64,
    ) -> Self {
        Self {
            git,
            metadata,
            max_branch_size,
        }
    }

    /// The configured branch capacity ceiling in bytes.
    pub fn max_branch_size(&self) -> u64 {
        self.max_branch_size
    }

    /// Select the branch new files should be assigned to.
    ///
    /// An empty store starts at branch 1 with size 0. `force_new`, or an
    /// accumulated size at or past the ceiling, rotates to the next id
    /// with size 0.
    pub async fn select(&self, force_new: bool) -> Result<Branch, UploadError> {
        Ok(self.select_with_freshness(force_new).await?.0)
    }

    /// Like [`select`](Self::select), additionally reporting whether the
    /// branch has no published rows yet. The flag cannot be derived from
    /// the size: a branch whose only assets are zero bytes long exists on
    /// the remote with a recomputed size of 0.
    async fn select_with_freshness(
        &self,
        force_new: bool,
    ) -> Result<(Branch, bool), UploadError> {
        let Some(recent) = self.metadata.most_recent().await? else {
            return Ok((Branch::initial(), true));
        };
        let id = BranchId::new(recent.branch.max(0) as u64);
        if force_new {
            return Ok((
                Branch {
                    id: id.next(),
                    size: 0,
                },
                true,
            ));
        }

        let size = self.metadata.sum_size_for_branch(recent.branch).await?;
        if size >= self.max_branch_size {
            tracing::debug!(branch = %id.next(), "branch full, rotating");
            Ok((
                Branch {
                    id: id.next(),
                    size: 0,
                },
                true,
            ))
        } else {
            tracing::debug!(branch = %id, size, "remaining on active branch");
            Ok((Branch { id, size }, false))
        }
    }

    /// Select a branch and check it out.
    ///
    /// A fresh unit (empty store or a rotation) is created as an orphan
    /// branch with an empty working tree, so every unit's storage
    /// footprint stays bounded and independent of its predecessors. An
    /// existing unit is checked out forcibly, optionally synchronized with
    /// the remote first (`sync_remote` is used once at startup to discard
    /// stale local state).
    pub async fn checkout(&self, force_new: bool, sync_remote: bool) -> Result<Branch, UploadError> {
        let (branch, fresh) = self.select_with_freshness(force_new).await?;
        let name = branch.id.to_name();
        if fresh {
            tracing::debug!(branch = %name, "checking out fresh orphan branch");
            self.git.checkout_orphan(&name).await?;
            self.git.remove_all_tracked().await?;
        } else {
            tracing::debug!(branch = %name, sync_remote, "checking out existing branch");
            if sync_remote {
                self.git.fetch(REMOTE_NAME, &name).await?;
            }
            self.git.checkout(&name, true).await?;
            if sync_remote {
                self.git.reset_hard(&format!("{REMOTE_NAME}/{name}")).await?;
            }
        }
        Ok(branch)
    }
}
