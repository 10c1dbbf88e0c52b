//! Tokio-backed deferred invoker.
//!
//! `tokio::spawn` gives no ordering guarantee between spawned tasks on a
//! multi-threaded runtime, so [`TokioInvoker`] does not spawn one task per
//! callback. It spawns a single drain task that reads an unbounded channel
//! and runs callbacks one after another, which keeps them FIFO.
//!
//! # Example
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), vow_invoker::InvokerError> {
//! use vow_invoker::TokioInvoker;
//!
//! let invoker = TokioInvoker::current()?;
//! let (tx, rx) = tokio::sync::oneshot::channel();
//! invoker.invoker().schedule(move || {
//!     let _ = tx.send(42);
//! });
//! assert_eq!(rx.await.ok(), Some(42));
//! # Ok(())
//! # }
//! ```

use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

use crate::invoker::{DeferredInvoker, Invoker, Task, run_isolated};

/// Errors that can occur while setting up an invoker.
#[derive(Debug, thiserror::Error)]
pub enum InvokerError {
    /// No tokio runtime is running on the current thread.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

struct ChannelInvoker {
    sender: UnboundedSender<Task>,
}

impl DeferredInvoker for ChannelInvoker {
    fn schedule(&self, task: Task) {
        if self.sender.send(task).is_err() {
            tracing::warn!("tokio invoker drain task has stopped; dropping task");
        }
    }

    fn name(&self) -> &'static str {
        "tokio"
    }
}

/// Runs deferred tasks on a tokio runtime in FIFO order.
///
/// The drain task stops once every [`Invoker`] handle obtained from this
/// value, and the value itself, have been dropped.
#[derive(Debug, Clone)]
pub struct TokioInvoker {
    invoker: Invoker,
}

impl TokioInvoker {
    /// Spawns the drain task on the given runtime.
    #[must_use]
    pub fn new(handle: &Handle) -> Self {
        let (sender, mut receiver) = unbounded_channel::<Task>();
        handle.spawn(async move {
            while let Some(task) = receiver.recv().await {
                run_isolated(task, "tokio");
            }
            tracing::trace!("tokio invoker drain task finished");
        });
        Self {
            invoker: Invoker::new(ChannelInvoker { sender }),
        }
    }

    /// Spawns the drain task on the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError::NoRuntime`] when called outside a tokio runtime.
    pub fn current() -> Result<Self, InvokerError> {
        let handle = Handle::try_current()?;
        Ok(Self::new(&handle))
    }

    /// Returns the [`Invoker`] handle promises should be created with.
    #[must_use]
    pub fn invoker(&self) -> Invoker {
        self.invoker.clone()
    }
}

impl From<TokioInvoker> for Invoker {
    fn from(value: TokioInvoker) -> Self {
        value.invoker
    }
}
