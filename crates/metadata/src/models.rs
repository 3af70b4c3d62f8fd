//! Database models mapping to the metadata schema.

use sqlx::FromRow;
use time::OffsetDateTime;

/// A published asset record.
///
/// Rows are insert-only: one row is written per file, in one batch per
/// publish, and only after the batch's push succeeded. A row is therefore
/// a proof that the bytes are reachable through the publish target.
#[derive(Debug, Clone, FromRow)]
pub struct AssetRow {
    /// Autoincrement rowid; ordering by id descending yields the most
    /// recently published asset and with it the current active branch.
    pub id: i64,
    /// Content hash (lowercase hex), unique.
    pub hash: String,
    /// Display name suffix, possibly empty.
    pub name: String,
    /// Branch the file was published to.
    pub branch: i64,
    /// Byte size of the file.
    pub size: i64,
    /// When the row was inserted.
    pub created_at: OffsetDateTime,
}

/// A new asset awaiting insertion after a successful publish.
#[derive(Debug, Clone)]
pub struct NewAsset {
    /// Content hash (lowercase hex).
    pub hash: String,
    /// Display name suffix, possibly empty.
    pub name: String,
    /// Branch the file was published to.
    pub branch: i64,
    /// Byte size of the file.
    pub size: i64,
}
