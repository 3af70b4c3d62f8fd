//! Git-backed media re-hosting backend.
//!
//! This crate implements the batched upload pipeline at the heart of
//! relink:
//! - [`queue::TaskQueue`] holds pending uploads and deduplicates them by
//!   content hash; concurrent requests for the same hash share one task.
//! - [`branch::BranchManager`] assigns files to capacity-bounded branches,
//!   recomputing accumulated sizes from persisted rows on every selection.
//! - [`pipeline::CommitPipeline`] moves a claimed batch into the working
//!   tree, commits, pushes, and persists metadata, all-or-nothing.
//! - [`scheduler::Scheduler`] is the single worker draining the queue.
//! - [`backend::GitBackend`] ties these together behind the
//!   `upload`/`stats`/`start`/`stop` surface.
//!
//! The version-control client and metadata store are capability traits so
//! the whole pipeline is testable against in-memory fakes.

pub mod analyze;
pub mod backend;
pub mod branch;
pub mod client;
pub mod error;
pub mod pipeline;
pub mod queue;
pub mod scheduler;
pub mod staging;

pub use analyze::{Analyzed, Analyzer};
pub use backend::GitBackend;
pub use branch::BranchManager;
pub use client::{CliGit, GitClient};
pub use error::{GitError, GitResult, UploadError, UploadResult};
pub use pipeline::CommitPipeline;
pub use queue::{Task, TaskQueue};
pub use scheduler::Scheduler;
pub use staging::Staging;

/// The remote name every publish targets.
pub const REMOTE_NAME: &str = "origin";
