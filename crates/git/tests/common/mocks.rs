//! Scripted git client fake for pipeline tests.

use async_trait::async_trait;
use relink_git::{GitError, GitResult};
use relink_git::GitClient;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Git client that records every call and can be told to fail pushes.
pub struct MockGit {
    calls: Mutex<Vec<String>>,
    fail_push: AtomicBool,
}

impl MockGit {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_push: AtomicBool::new(false),
        }
    }

    /// Make every subsequent push fail with a simulated network error.
    pub fn set_fail_push(&self, fail: bool) {
        self.fail_push.store(fail, Ordering::SeqCst);
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for MockGit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitClient for MockGit {
    async fn init(&self) -> GitResult<()> {
        self.record("init".to_string());
        Ok(())
    }

    async fn add_remote(&self, name: &str, _url: &str) -> GitResult<()> {
        self.record(format!("add_remote {name}"));
        Ok(())
    }

    async fn checkout_orphan(&self, branch: &str) -> GitResult<()> {
        self.record(format!("checkout_orphan {branch}"));
        Ok(())
    }

    async fn remove_all_tracked(&self) -> GitResult<()> {
        self.record("remove_all_tracked".to_string());
        Ok(())
    }

    async fn fetch(&self, remote: &str, branch: &str) -> GitResult<()> {
        self.record(format!("fetch {remote} {branch}"));
        Ok(())
    }

    async fn checkout(&self, branch: &str, force: bool) -> GitResult<()> {
        self.record(format!("checkout {branch} force={force}"));
        Ok(())
    }

    async fn reset_hard(&self, target: &str) -> GitResult<()> {
        self.record(format!("reset_hard {target}"));
        Ok(())
    }

    async fn stage(&self, paths: &[String]) -> GitResult<()> {
        self.record(format!("stage {}", paths.join(",")));
        Ok(())
    }

    async fn commit(&self, message: &str) -> GitResult<()> {
        self.record(format!("commit {message}"));
        Ok(())
    }

    async fn push(&self, remote: &str, branch: &str, force_with_lease: bool) -> GitResult<()> {
        self.record(format!("push {remote} {branch} lease={force_with_lease}"));
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(GitError::Command {
                command: format!("push {remote} {branch}"),
                status: "1".to_string(),
                stderr: "simulated network error".to_string(),
            });
        }
        Ok(())
    }
}
