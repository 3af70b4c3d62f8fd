//! Metadata store trait and the SQLite implementation.

use crate::error::MetadataResult;
use crate::models::{AssetRow, NewAsset};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Aggregate statistics over all published assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetStats {
    /// Number of published assets.
    pub asset_count: u64,
    /// Total byte size of published assets.
    pub asset_size: u64,
}

/// Metadata store capability consumed by the upload pipeline.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;

    /// Get the most recently published asset, if any.
    ///
    /// Its `branch` field identifies the current active branch.
    async fn most_recent(&self) -> MetadataResult<Option<AssetRow>>;

    /// Sum the sizes of all assets published to the given branch.
    ///
    /// This is a live aggregate on purpose: branch accounting must survive
    /// process restarts, so it is recomputed from rows on every selection
    /// instead of trusting an incremental counter.
    async fn sum_size_for_branch(&self, branch: i64) -> MetadataResult<u64>;

    /// Look up a published asset by content hash.
    async fn get_by_hash(&self, hash: &str) -> MetadataResult<Option<AssetRow>>;

    /// Insert one batch of newly published assets.
    ///
    /// All rows are written in a single transaction; the caller invokes
    /// this only after the batch's push succeeded. A hash that already has
    /// a row is updated in place, so replaying a publish of known content
    /// cannot poison the batch it rides in.
    async fn insert_batch(&self, assets: &[NewAsset]) -> MetadataResult<()>;

    /// Aggregate count and size over all published assets.
    async fn stats(&self) -> MetadataResult<AssetStats>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store, running migrations.
    pub async fn new(
        path: impl AsRef<Path>,
        query_timeout_secs: Option<u64>,
    ) -> MetadataResult<Self> {
        let path = path.as_ref();
        let query_timeout_secs = query_timeout_secs.unwrap_or(600);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection avoids
            // persistent "database is locked" failures under concurrent handlers.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::debug!(
            query_timeout_secs = query_timeout_secs,
            path = %path.display(),
            "sqlite metadata store opened"
        );

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS assets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                hash TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL DEFAULT '',
                branch INTEGER NOT NULL,
                size INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Branch accounting runs a SUM per selection; keep it indexed.
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_assets_branch ON assets(branch)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn most_recent(&self) -> MetadataResult<Option<AssetRow>> {
        let row = sqlx::query_as::<_, AssetRow>(
            "SELECT id, hash, name, branch, size, created_at
             FROM assets ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn sum_size_for_branch(&self, branch: i64) -> MetadataResult<u64> {
        let total: Option<i64> =
            sqlx::query_scalar("SELECT SUM(size) FROM assets WHERE branch = ?")
                .bind(branch)
                .fetch_one(&self.pool)
                .await?;
        Ok(total.unwrap_or(0).max(0) as u64)
    }

    async fn get_by_hash(&self, hash: &str) -> MetadataResult<Option<AssetRow>> {
        let row = sqlx::query_as::<_, AssetRow>(
            "SELECT id, hash, name, branch, size, created_at
             FROM assets WHERE hash = ?",
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_batch(&self, assets: &[NewAsset]) -> MetadataResult<()> {
        if assets.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for asset in assets {
            sqlx::query(
                "INSERT INTO assets (hash, name, branch, size, created_at)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(hash) DO UPDATE SET
                     name = excluded.name,
                     branch = excluded.branch,
                     size = excluded.size,
                     created_at = excluded.created_at",
            )
            .bind(&asset.hash)
            .bind(&asset.name)
            .bind(asset.branch)
            .bind(asset.size)
            .bind(time::OffsetDateTime::now_utc())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn stats(&self) -> MetadataResult<AssetStats> {
        let (count, size): (i64, Option<i64>) =
            sqlx::query_as("SELECT COUNT(id), SUM(size) FROM assets")
                .fetch_one(&self.pool)
                .await?;
        Ok(AssetStats {
            asset_count: count.max(0) as u64,
            asset_size: size.unwrap_or(0).max(0) as u64,
        })
    }
}
