//! Staging filesystem for fetched media.
//!
//! Fetched bytes are written to a temp directory keyed by content hash,
//! then moved into the repository working tree when their batch is
//! published. The move is a rename, atomic with respect to concurrent
//! readers as long as both directories live on one filesystem.

use relink_core::ContentHash;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Staging area spanning the temp directory and the repository working tree.
#[derive(Clone, Debug)]
pub struct Staging {
    temp_dir: PathBuf,
    work_dir: PathBuf,
}

impl Staging {
    /// Create a staging area. Call [`Staging::init`] before first use.
    pub fn new(temp_dir: impl AsRef<Path>, work_dir: impl AsRef<Path>) -> Self {
        Self {
            temp_dir: temp_dir.as_ref().to_path_buf(),
            work_dir: work_dir.as_ref().to_path_buf(),
        }
    }

    /// Ensure both directories exist.
    pub async fn init(&self) -> io::Result<()> {
        fs::create_dir_all(&self.temp_dir).await?;
        fs::create_dir_all(&self.work_dir).await?;
        Ok(())
    }

    /// Write fetched bytes to the temp path for the given hash.
    pub async fn write_temp(&self, hash: &ContentHash, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.temp_dir.join(hash.to_hex());
        fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Atomically move a staged temp file into the working tree under the
    /// given filename, returning the final path.
    pub async fn move_into_place(&self, temp: &Path, filename: &str) -> io::Result<PathBuf> {
        let final_path = self.work_dir.join(filename);
        fs::rename(temp, &final_path).await?;
        Ok(final_path)
    }

    /// The repository working tree directory.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}
