//! Core domain types and shared logic for the relink media re-hosting service.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Content hashes for deduplication
//! - Branch identifiers and their on-the-wire naming
//! - File descriptors produced by the content analyzer
//! - Configuration for every crate in the workspace

pub mod asset;
pub mod branch;
pub mod config;
pub mod error;
pub mod hash;

pub use asset::FileDescriptor;
pub use branch::{BRANCH_NAME_WIDTH, Branch, BranchId};
pub use error::{Error, Result};
pub use hash::ContentHash;

/// Default branch capacity ceiling: 50 MiB.
pub const DEFAULT_MAX_BRANCH_SIZE: u64 = 50 * 1024 * 1024;

/// Default flush interval for the upload scheduler: 3 seconds.
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 3000;

/// Default maximum size of a single fetched file: 50 MiB.
pub const DEFAULT_MAX_FETCH_SIZE: u64 = 50 * 1024 * 1024;
