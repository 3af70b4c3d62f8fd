//! In-memory task queue with content-hash deduplication.
//!
//! Enqueue is safe from many concurrent callers; a single mutex guards the
//! pending list and the live-task index, and no lock is held across await
//! points. A task stays in the live index from creation until its batch's
//! publish resolves, so every request for an in-flight hash attaches to
//! the existing task instead of duplicating the upload.

use crate::error::{UploadError, UploadResult};
use relink_core::FileDescriptor;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// One pending upload, shared between the queue and its waiters.
pub struct Task {
    /// The analyzed file this task will publish.
    pub descriptor: FileDescriptor,
    waiters: Mutex<Vec<oneshot::Sender<UploadResult>>>,
}

impl Task {
    fn new(descriptor: FileDescriptor) -> Arc<Self> {
        Arc::new(Self {
            descriptor,
            waiters: Mutex::new(Vec::new()),
        })
    }

    /// The live-index key for this task.
    pub fn hash_hex(&self) -> String {
        self.descriptor.hash.to_hex()
    }

    fn add_waiter(&self, sender: oneshot::Sender<UploadResult>) {
        self.waiters.lock().expect("waiter lock poisoned").push(sender);
    }

    fn take_waiters(&self) -> Vec<oneshot::Sender<UploadResult>> {
        std::mem::take(&mut *self.waiters.lock().expect("waiter lock poisoned"))
    }

    /// Resolve every waiter with the task's public URL.
    pub fn resolve(&self, url: &str) {
        for waiter in self.take_waiters() {
            // A dropped receiver means the caller went away; nothing to do.
            let _ = waiter.send(Ok(url.to_string()));
        }
    }

    /// Reject every waiter with the batch's failure.
    pub fn reject(&self, err: &UploadError) {
        for waiter in self.take_waiters() {
            let _ = waiter.send(Err(err.clone()));
        }
    }
}

struct QueueInner {
    pending: VecDeque<Arc<Task>>,
    live: HashMap<String, Arc<Task>>,
}

/// The dedup queue feeding the scheduler.
pub struct TaskQueue {
    inner: Mutex<QueueInner>,
}

impl TaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                pending: VecDeque::new(),
                live: HashMap::new(),
            }),
        }
    }

    /// Register an upload request.
    ///
    /// If a live task for the hash exists the caller becomes one of its
    /// waiters; otherwise a new task is appended to the pending list. The
    /// returned receiver completes when the task's batch publishes.
    pub fn enqueue(&self, descriptor: FileDescriptor) -> oneshot::Receiver<UploadResult> {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.inner.lock().expect("queue lock poisoned");
        let key = descriptor.hash.to_hex();
        match inner.live.get(&key) {
            Some(task) => task.add_waiter(tx),
            None => {
                let task = Task::new(descriptor);
                task.add_waiter(tx);
                inner.pending.push_back(Arc::clone(&task));
                inner.live.insert(key, task);
            }
        }
        rx
    }

    /// Whether no tasks are pending.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().expect("queue lock poisoned").pending.is_empty()
    }

    /// Number of pending (unclaimed) tasks.
    pub fn pending_len(&self) -> usize {
        self.inner.lock().expect("queue lock poisoned").pending.len()
    }

    /// Claim a batch of tasks in strict FIFO order.
    ///
    /// Tasks are popped from the front while the cumulative size fits the
    /// budget; the first task that would overflow stops the batch and is
    /// retried against the next (possibly larger) budget. No later, smaller
    /// task is ever claimed over it.
    ///
    /// With `accept_oversized` (used after a rotation opened a fresh
    /// branch), a head task that alone exceeds even the full budget is
    /// still claimed, by itself: a file larger than the branch ceiling gets
    /// a dedicated branch rather than being starved forever.
    ///
    /// Claimed tasks stay in the live index until [`TaskQueue::finish_batch`].
    pub fn claim_batch(&self, budget: u64, accept_oversized: bool) -> Vec<Arc<Task>> {
        let mut inner = self.inner.lock().expect("queue lock poisoned");
        let mut batch = Vec::new();
        let mut total: u64 = 0;

        while let Some(front) = inner.pending.front() {
            let size = front.descriptor.size;
            if total.saturating_add(size) > budget {
                if batch.is_empty() && accept_oversized {
                    let task = inner.pending.pop_front().expect("front checked");
                    batch.push(task);
                }
                break;
            }
            total += size;
            let task = inner.pending.pop_front().expect("front checked");
            batch.push(task);
        }
        batch
    }

    /// Evict a published (or failed) batch from the live index.
    ///
    /// Called for every outcome, before waiters are resolved, so a
    /// subsequent request for a failed hash starts a fresh attempt.
    pub fn finish_batch(&self, batch: &[Arc<Task>]) {
        let mut inner = self.inner.lock().expect("queue lock poisoned");
        for task in batch {
            inner.live.remove(&task.hash_hex());
        }
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
