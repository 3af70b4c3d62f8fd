//! Metadata store abstraction and implementations for relink.
//!
//! This crate provides the control-plane data model: one insert-only table
//! of published assets. The store is the single source of truth both for
//! "is this hash already published" and for branch size accounting; the
//! upload pipeline never trusts an in-memory byte total across restarts.

pub mod error;
pub mod models;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use store::{AssetStats, MetadataStore, SqliteStore};

use relink_core::config::MetadataConfig;
use std::sync::Arc;

/// Create a metadata store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    match config {
        MetadataConfig::Sqlite {
            path,
            query_timeout_secs,
        } => {
            let store = SqliteStore::new(path, *query_timeout_secs).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
    }
}
