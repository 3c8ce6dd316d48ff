//! Self-scaling worker pool
//!
//! A cohort of workers drains the shared queue. Any worker that times out
//! waiting for work, or hits a transient failure, closes the admission
//! gate and exits; the whole cohort then winds down. A single supervisor
//! loop owns every lifecycle decision: it watches worker exits and, when
//! the last worker is gone, either restarts a full fresh cohort (the queue
//! still has work, so the stall was collective but transient) or declares
//! quiescence and emits the shutdown report exactly once.
//!
//! Throttling to zero and fully re-ramping is deliberately crude: one
//! transient network error drains the entire pool, trading efficiency for
//! a single uniform recovery path. The pool-size cap is the only bound on
//! concurrent outbound connections.

use crate::dispatch::execute::{Executor, TaskError};
use crate::dispatch::queue::TaskQueue;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Worker pool sizing and wait behavior
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum concurrently running workers
    pub workers: usize,

    /// How long a worker waits on an empty queue before giving up
    pub pop_timeout: Duration,
}

impl PoolConfig {
    pub fn from_settings(settings: &crate::config::PoolSettings) -> Self {
        Self {
            workers: settings.workers,
            pop_timeout: Duration::from_secs(settings.pop_timeout_secs),
        }
    }
}

/// Why a worker left its loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitReason {
    /// The queue stayed empty for the whole pop wait
    Idle,

    /// A transient failure; the task was re-queued first
    Throttled,
}

enum WorkerEvent {
    Exited(ExitReason),
}

struct Gate {
    active: usize,
    accepting: bool,
}

/// Shared worker-pool state: the active-worker count and the admission
/// gate, both behind one mutex
///
/// The gate is one-way within a cohort: any worker can close it, and it
/// only re-opens when the supervisor starts a fresh cohort.
pub struct PoolState {
    gate: Mutex<Gate>,
}

impl PoolState {
    fn new() -> Self {
        Self {
            gate: Mutex::new(Gate {
                active: 0,
                accepting: true,
            }),
        }
    }

    /// Number of currently active workers
    pub fn active_workers(&self) -> usize {
        self.gate.lock().unwrap().active
    }

    /// Admits one more worker if the gate is open and the cap allows it
    fn try_admit(&self, cap: usize) -> bool {
        let mut gate = self.gate.lock().unwrap();
        if gate.accepting && gate.active < cap {
            gate.active += 1;
            true
        } else {
            false
        }
    }

    /// Closes the admission gate for the current cohort
    fn stop_admitting(&self) {
        self.gate.lock().unwrap().accepting = false;
    }

    /// Re-opens the gate for a fresh cohort
    fn reopen(&self) {
        self.gate.lock().unwrap().accepting = true;
    }

    /// Records one worker exit, returning how many remain
    fn worker_exited(&self) -> usize {
        let mut gate = self.gate.lock().unwrap();
        gate.active = gate.active.saturating_sub(1);
        gate.active
    }
}

/// Terminal report emitted exactly once per run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Wall-clock time from pool start to quiescence
    pub elapsed: Duration,

    /// Tasks completed successfully across all cohorts
    pub tasks_completed: u64,
}

/// Owns the workers draining one task queue
pub struct WorkerPool {
    queue: Arc<TaskQueue>,
    executor: Arc<dyn Executor>,
    state: Arc<PoolState>,
    config: PoolConfig,
}

impl WorkerPool {
    pub fn new(queue: Arc<TaskQueue>, executor: Arc<dyn Executor>, config: PoolConfig) -> Self {
        Self {
            queue,
            executor,
            state: Arc::new(PoolState::new()),
            config,
        }
    }

    /// Shared pool state, for observability
    pub fn state(&self) -> Arc<PoolState> {
        self.state.clone()
    }

    /// Runs the pool to terminal quiescence
    ///
    /// Returns once no worker is active and the queue is empty. Transient
    /// retries are unbounded: a task that keeps failing transiently keeps
    /// being re-queued across cohort restarts for as long as the run lasts.
    pub async fn run(&self) -> RunReport {
        let started = Instant::now();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();

        let mut spawned = self.spawn_cohort(&events_tx);
        tracing::info!(workers = spawned, "worker pool started");

        while spawned > 0 {
            let Some(WorkerEvent::Exited(reason)) = events_rx.recv().await else {
                break;
            };
            let remaining = self.state.active_workers();
            tracing::debug!(?reason, remaining, "worker exited");

            if remaining > 0 {
                continue;
            }
            if self.queue.is_empty() {
                break;
            }

            // The cohort drained with work left over: restart from zero.
            tracing::info!(queued = self.queue.len(), "queue not drained, restarting workers");
            self.state.reopen();
            spawned = self.spawn_cohort(&events_tx);
        }

        let report = RunReport {
            elapsed: started.elapsed(),
            tasks_completed: self.queue.completed(),
        };
        tracing::info!(
            elapsed_secs = report.elapsed.as_secs_f64(),
            tasks_completed = report.tasks_completed,
            "worker pool finished"
        );
        report
    }

    /// Spawns workers one at a time until the cap is reached or the gate
    /// closes (a failure during ramp-up halts further spawning)
    fn spawn_cohort(&self, events: &mpsc::UnboundedSender<WorkerEvent>) -> usize {
        let mut spawned = 0;
        while self.state.try_admit(self.config.workers) {
            let queue = self.queue.clone();
            let executor = self.executor.clone();
            let state = self.state.clone();
            let events = events.clone();
            let pop_timeout = self.config.pop_timeout;
            tokio::spawn(worker_loop(queue, executor, state, pop_timeout, events));
            spawned += 1;
        }
        spawned
    }
}

/// One worker: pop, execute, report, repeat
async fn worker_loop(
    queue: Arc<TaskQueue>,
    executor: Arc<dyn Executor>,
    state: Arc<PoolState>,
    pop_timeout: Duration,
    events: mpsc::UnboundedSender<WorkerEvent>,
) {
    let reason = loop {
        let Some(task) = queue.pop(pop_timeout).await else {
            break ExitReason::Idle;
        };

        match executor.execute(&task).await {
            Ok(()) => queue.mark_completed(),
            Err(TaskError::Transient(message)) => {
                tracing::warn!(
                    argument = task.action.argument(),
                    %message,
                    "transient failure, re-queueing task"
                );
                queue.push(task);
                break ExitReason::Throttled;
            }
            Err(TaskError::Abandoned(message)) => {
                tracing::error!(
                    argument = task.action.argument(),
                    %message,
                    "task failed, dropping"
                );
            }
        }
    };

    state.stop_admitting();
    state.worker_exited();
    let _ = events.send(WorkerEvent::Exited(reason));
}
