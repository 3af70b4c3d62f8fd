//! Version-control client capability.
//!
//! The pipeline never implements version-control primitives itself; it
//! consumes them through this small command interface. The production
//! implementation shells out to the `git` binary, tests substitute a
//! scripted mock.

use crate::error::{GitError, GitResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Capability interface over the version-control operations the pipeline
/// needs.
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Initialize an empty repository in the working directory.
    async fn init(&self) -> GitResult<()>;

    /// Register a named remote.
    async fn add_remote(&self, name: &str, url: &str) -> GitResult<()>;

    /// Check out a new orphan branch carrying no history.
    async fn checkout_orphan(&self, branch: &str) -> GitResult<()>;

    /// Remove every tracked file from the index and working tree.
    async fn remove_all_tracked(&self) -> GitResult<()>;

    /// Fetch one branch from a remote.
    async fn fetch(&self, remote: &str, branch: &str) -> GitResult<()>;

    /// Check out an existing branch.
    async fn checkout(&self, branch: &str, force: bool) -> GitResult<()>;

    /// Hard-reset the working tree to a ref.
    async fn reset_hard(&self, target: &str) -> GitResult<()>;

    /// Stage the given paths.
    async fn stage(&self, paths: &[String]) -> GitResult<()>;

    /// Create a commit covering everything staged.
    async fn commit(&self, message: &str) -> GitResult<()>;

    /// Push a branch to a remote, forcing with lease when requested.
    async fn push(&self, remote: &str, branch: &str, force_with_lease: bool) -> GitResult<()>;
}

/// `GitClient` implementation shelling out to the `git` binary.
pub struct CliGit {
    work_dir: PathBuf,
}

impl CliGit {
    /// Create a client operating on the given working directory.
    pub fn new(work_dir: impl AsRef<Path>) -> Self {
        Self {
            work_dir: work_dir.as_ref().to_path_buf(),
        }
    }

    /// Whether the working directory already holds a repository.
    pub fn is_initialized(&self) -> bool {
        self.work_dir.join(".git").exists()
    }

    async fn run(&self, args: &[&str]) -> GitResult<()> {
        let output = Command::new("git")
            .current_dir(&self.work_dir)
            .args(args)
            .output()
            .await?;

        if !output.status.success() {
            return Err(GitError::Command {
                command: args.join(" "),
                status: output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl GitClient for CliGit {
    async fn init(&self) -> GitResult<()> {
        self.run(&["init"]).await?;
        // CRLF translation would change content hashes between platforms.
        self.run(&["config", "core.autocrlf", "false"]).await
    }

    async fn add_remote(&self, name: &str, url: &str) -> GitResult<()> {
        self.run(&["remote", "add", name, url]).await
    }

    async fn checkout_orphan(&self, branch: &str) -> GitResult<()> {
        // A publish that failed after committing leaves a local ref with
        // this name, which `checkout --orphan` refuses to reuse. Detach
        // and delete it first; both commands fail on an unborn HEAD or a
        // missing ref and are ignored.
        let _ = self.run(&["checkout", "--detach"]).await;
        let _ = self.run(&["branch", "-D", branch]).await;
        self.run(&["checkout", "--orphan", branch]).await
    }

    async fn remove_all_tracked(&self) -> GitResult<()> {
        self.run(&["rm", "-rf", "--ignore-unmatch", "."]).await
    }

    async fn fetch(&self, remote: &str, branch: &str) -> GitResult<()> {
        self.run(&["fetch", remote, branch]).await
    }

    async fn checkout(&self, branch: &str, force: bool) -> GitResult<()> {
        if force {
            self.run(&["checkout", "-f", branch]).await
        } else {
            self.run(&["checkout", branch]).await
        }
    }

    async fn reset_hard(&self, target: &str) -> GitResult<()> {
        self.run(&["reset", "--hard", target]).await
    }

    async fn stage(&self, paths: &[String]) -> GitResult<()> {
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run(&args).await
    }

    async fn commit(&self, message: &str) -> GitResult<()> {
        self.run(&["commit", "-m", message]).await
    }

    async fn push(&self, remote: &str, branch: &str, force_with_lease: bool) -> GitResult<()> {
        if force_with_lease {
            self.run(&["push", "-u", "--force-with-lease", remote, branch])
                .await
        } else {
            self.run(&["push", "-u", remote, branch]).await
        }
    }
}
