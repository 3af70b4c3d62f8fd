//! In-memory metadata store fake for pipeline tests.

use async_trait::async_trait;
use relink_metadata::models::{AssetRow, NewAsset};
use relink_metadata::{AssetStats, MetadataResult, MetadataStore};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// Metadata store backed by a plain vector, mirroring the SQLite schema's
/// autoincrement ids and upsert-by-hash insert semantics.
pub struct MemoryStore {
    rows: Mutex<Vec<AssetRow>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Snapshot of all rows, in insertion order.
    pub fn rows(&self) -> Vec<AssetRow> {
        self.rows.lock().unwrap().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn migrate(&self) -> MetadataResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        Ok(())
    }

    async fn most_recent(&self) -> MetadataResult<Option<AssetRow>> {
        Ok(self.rows.lock().unwrap().last().cloned())
    }

    async fn sum_size_for_branch(&self, branch: i64) -> MetadataResult<u64> {
        let total: i64 = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.branch == branch)
            .map(|row| row.size)
            .sum();
        Ok(total.max(0) as u64)
    }

    async fn get_by_hash(&self, hash: &str) -> MetadataResult<Option<AssetRow>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.hash == hash)
            .cloned())
    }

    async fn insert_batch(&self, assets: &[NewAsset]) -> MetadataResult<()> {
        let mut rows = self.rows.lock().unwrap();
        for asset in assets {
            if let Some(row) = rows.iter_mut().find(|row| row.hash == asset.hash) {
                row.name = asset.name.clone();
                row.branch = asset.branch;
                row.size = asset.size;
                row.created_at = time::OffsetDateTime::now_utc();
            } else {
                rows.push(AssetRow {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    hash: asset.hash.clone(),
                    name: asset.name.clone(),
                    branch: asset.branch,
                    size: asset.size,
                    created_at: time::OffsetDateTime::now_utc(),
                });
            }
        }
        Ok(())
    }

    async fn stats(&self) -> MetadataResult<AssetStats> {
        let rows = self.rows.lock().unwrap();
        Ok(AssetStats {
            asset_count: rows.len() as u64,
            asset_size: rows.iter().map(|row| row.size.max(0) as u64).sum(),
        })
    }
}
