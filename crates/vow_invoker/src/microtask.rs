//! Host-drained microtask queue.
//!
//! [`MicrotaskQueue`] stores scheduled tasks until the host asks it to run
//! them. This makes the "after the current stack unwinds" rule explicit: a
//! task can only run from inside [`run_until_idle`](MicrotaskQueue::run_until_idle)
//! or [`run_next`](MicrotaskQueue::run_next), never from inside `schedule`.
//!
//! Because nothing runs in the background, the queue is fully deterministic,
//! which makes it the invoker of choice for tests and single-threaded hosts.
//!
//! # Example
//!
//! ```
//! use vow_invoker::{MicrotaskQueue, QueueConfig};
//!
//! let queue = MicrotaskQueue::with_config(QueueConfig::default().with_drain_budget(2));
//! let invoker = queue.invoker();
//!
//! for _ in 0..3 {
//!     invoker.schedule(|| {});
//! }
//!
//! assert_eq!(queue.run_until_idle(), 2);
//! assert_eq!(queue.len(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::invoker::{DeferredInvoker, Invoker, Task, run_isolated};

// ─────────────────────────────────────────────────────────────────────────────
// QueueConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for a [`MicrotaskQueue`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueConfig {
    /// Maximum number of tasks a single drain may run.
    ///
    /// Tasks scheduled by running tasks count against the same budget. `None`
    /// drains until the queue is empty.
    pub drain_budget: Option<usize>,
}

impl QueueConfig {
    /// Limits how many tasks one call to
    /// [`run_until_idle`](MicrotaskQueue::run_until_idle) may run.
    #[must_use]
    pub fn with_drain_budget(mut self, budget: usize) -> Self {
        self.drain_budget = Some(budget);
        self
    }

    /// Removes the drain budget.
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.drain_budget = None;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MicrotaskQueue
// ─────────────────────────────────────────────────────────────────────────────

struct QueueState {
    tasks: Mutex<VecDeque<Task>>,
    config: QueueConfig,
}

impl DeferredInvoker for QueueState {
    fn schedule(&self, task: Task) {
        self.tasks.lock().push_back(task);
    }

    fn name(&self) -> &'static str {
        "microtask"
    }
}

/// A FIFO task queue drained explicitly by the host.
///
/// Cloning the queue yields another handle to the same tasks.
#[derive(Clone)]
pub struct MicrotaskQueue {
    state: Arc<QueueState>,
}

impl Default for MicrotaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MicrotaskQueue {
    /// Creates an empty queue with no drain budget.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    /// Creates an empty queue with the given configuration.
    #[must_use]
    pub fn with_config(config: QueueConfig) -> Self {
        Self {
            state: Arc::new(QueueState {
                tasks: Mutex::new(VecDeque::new()),
                config,
            }),
        }
    }

    /// Returns the configuration this queue was created with.
    #[must_use]
    pub fn config(&self) -> QueueConfig {
        self.state.config
    }

    /// Returns an [`Invoker`] that schedules onto this queue.
    #[must_use]
    pub fn invoker(&self) -> Invoker {
        Invoker::from_arc(self.state.clone())
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.tasks.lock().len()
    }

    /// Returns `true` if no tasks are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.tasks.lock().is_empty()
    }

    /// Runs the oldest waiting task, if any.
    ///
    /// Returns `false` when the queue was empty.
    pub fn run_next(&self) -> bool {
        // The lock must be released before the task runs: tasks schedule more tasks.
        let task = self.state.tasks.lock().pop_front();
        match task {
            Some(task) => {
                run_isolated(task, "microtask");
                true
            }
            None => false,
        }
    }

    /// Runs tasks in FIFO order until the queue is empty or the drain budget
    /// is spent, and returns how many tasks ran.
    ///
    /// Tasks scheduled while draining run in the same drain.
    pub fn run_until_idle(&self) -> usize {
        let budget = self.state.config.drain_budget.unwrap_or(usize::MAX);
        let mut ran = 0;
        while ran < budget && self.run_next() {
            ran += 1;
        }
        if ran == budget && !self.is_empty() {
            tracing::debug!(
                ran,
                remaining = self.len(),
                "microtask drain budget exhausted"
            );
        }
        ran
    }
}

impl core::fmt::Debug for MicrotaskQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MicrotaskQueue")
            .field("pending", &self.len())
            .field("config", &self.state.config)
            .finish()
    }
}
