//! Error types for the git backend.

use thiserror::Error;

/// Errors from the version-control client.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("git {command} exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for git client operations.
pub type GitResult<T> = std::result::Result<T, GitError>;

/// Errors surfaced to upload callers.
///
/// One publish failure rejects every waiter of the affected batch, so this
/// type is `Clone` and carries its causes as strings.
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("file too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("staging error: {0}")]
    Staging(String),

    #[error("git error: {0}")]
    Git(String),

    #[error("metadata error: {0}")]
    Metadata(String),

    #[error("upload queue stopped")]
    Stopped,
}

impl From<GitError> for UploadError {
    fn from(err: GitError) -> Self {
        Self::Git(err.to_string())
    }
}

impl From<relink_metadata::MetadataError> for UploadError {
    fn from(err: relink_metadata::MetadataError) -> Self {
        Self::Metadata(err.to_string())
    }
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        Self::Staging(err.to_string())
    }
}

/// Result type delivered to every waiter of a task.
pub type UploadResult = std::result::Result<String, UploadError>;
