//! The deferred invoker contract.
//!
//! A [`DeferredInvoker`] accepts [`Task`]s and promises three things about
//! them:
//!
//! - a task never runs inside the call to [`schedule`](DeferredInvoker::schedule)
//! - tasks run in the order they were scheduled
//! - a panicking task does not prevent the tasks after it from running
//!
//! Hosts choose one invoker at start-up and hand promises an [`Invoker`]
//! handle to it. Dependent promises inherit the handle of the promise they
//! were derived from, so a whole chain shares one queue.

use core::any::Any;
use core::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A host-supplied scheduling primitive.
///
/// Implementations must run every scheduled task exactly once, after the
/// current call stack has unwound, in FIFO order.
///
/// # Example
///
/// ```
/// use std::collections::VecDeque;
/// use parking_lot::Mutex;
/// use vow_invoker::{DeferredInvoker, Invoker, Task};
///
/// #[derive(Default)]
/// struct Backlog(Mutex<VecDeque<Task>>);
///
/// impl DeferredInvoker for Backlog {
///     fn schedule(&self, task: Task) {
///         self.0.lock().push_back(task);
///     }
/// }
///
/// let invoker = Invoker::new(Backlog::default());
/// invoker.schedule(|| {});
/// ```
pub trait DeferredInvoker: Send + Sync + 'static {
    /// Enqueues a task to run after the current call stack unwinds.
    fn schedule(&self, task: Task);

    /// Returns a short name for log fields.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Cloneable handle to the host's [`DeferredInvoker`].
#[derive(Clone)]
pub struct Invoker {
    inner: Arc<dyn DeferredInvoker>,
}

impl Invoker {
    /// Wraps an invoker implementation in a shareable handle.
    #[must_use]
    pub fn new(invoker: impl DeferredInvoker) -> Self {
        Self {
            inner: Arc::new(invoker),
        }
    }

    /// Wraps an already shared invoker implementation.
    #[must_use]
    pub fn from_arc(invoker: Arc<dyn DeferredInvoker>) -> Self {
        Self { inner: invoker }
    }

    /// Schedules `task` on the underlying invoker.
    pub fn schedule(&self, task: impl FnOnce() + Send + 'static) {
        self.inner.schedule(Box::new(task));
    }

    /// Schedules an already boxed task.
    pub fn schedule_boxed(&self, task: Task) {
        self.inner.schedule(task);
    }

    /// Returns the name of the underlying invoker.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    /// Returns `true` if both handles point at the same invoker.
    #[must_use]
    pub fn same_as(&self, other: &Invoker) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoker")
            .field("name", &self.inner.name())
            .finish()
    }
}

/// Extracts a readable message from a panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Runs a task so that a panic inside it is logged instead of unwinding into
/// the drain loop.
///
/// Returns `false` if the task panicked.
pub(crate) fn run_isolated(task: Task, invoker: &'static str) -> bool {
    match catch_unwind(AssertUnwindSafe(task)) {
        Ok(()) => true,
        Err(payload) => {
            tracing::error!(
                invoker,
                panic = %panic_message(payload.as_ref()),
                "deferred task panicked"
            );
            false
        }
    }
}
