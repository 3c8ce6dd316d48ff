//! Shared task queue
//!
//! An unbounded priority queue drained by every worker in the pool.
//! `push` never blocks; `pop` waits up to a bounded timeout for work, and
//! a timeout is the normal drain signal rather than an error. The queue
//! also carries the completed-task counter used by the shutdown report.

use crate::dispatch::task::{QueuedTask, Task};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

/// How often completed-task progress is logged
const PROGRESS_INTERVAL: u64 = 100;

struct QueueInner {
    heap: BinaryHeap<QueuedTask>,
    next_seq: u64,
}

/// Unbounded priority queue of pending tasks
///
/// Lower priority values dequeue first; within a band, insertion order
/// holds. Safe for any number of concurrent pushers and poppers; no two
/// poppers ever receive the same task.
pub struct TaskQueue {
    inner: Mutex<QueueInner>,
    notify: Notify,
    completed: AtomicU64,
}

impl TaskQueue {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                heap: BinaryHeap::new(),
                next_seq: 0,
            }),
            notify: Notify::new(),
            completed: AtomicU64::new(0),
        }
    }

    /// Inserts a task; never blocks
    pub fn push(&self, task: Task) {
        {
            let mut inner = self.inner.lock().unwrap();
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.heap.push(QueuedTask { task, seq });
        }
        self.notify.notify_waiters();
    }

    /// Removes the highest-priority oldest task if one is queued
    pub fn try_pop(&self) -> Option<Task> {
        let mut inner = self.inner.lock().unwrap();
        inner.heap.pop().map(|queued| queued.task)
    }

    /// Waits up to `wait` (total, not per attempt) for a task
    ///
    /// `None` means the queue stayed empty for the whole wait.
    pub async fn pop(&self, wait: Duration) -> Option<Task> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(task) = self.try_pop() {
                return Some(task);
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return None;
            }
        }
    }

    /// Records one successfully completed task
    ///
    /// Observability only; completion counts play no part in scheduling.
    pub fn mark_completed(&self) {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if completed % PROGRESS_INTERVAL == 0 {
            tracing::info!(completed, queued = self.len(), "progress");
        }
    }

    /// Total tasks completed so far
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Approximate queue depth
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().heap.len()
    }

    /// Whether the queue is currently empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().heap.is_empty()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
