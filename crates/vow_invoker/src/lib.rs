//! Deferred invokers for `vow` (Layer 1).
//!
//! Promise callbacks never run inside the call that settled the promise or
//! registered the callback. Instead they are handed to a [`DeferredInvoker`],
//! which runs them later, one at a time, in the order they were scheduled.
//!
//! - [`invoker`] - The [`DeferredInvoker`] trait and the cloneable [`Invoker`] handle
//! - [`microtask`] - [`MicrotaskQueue`], a host-drained deterministic queue
//! - [`runtime`] - [`TokioInvoker`], a queue drained by a single tokio task
//!
//! # Architecture
//!
//! - **Layer 1** (`vow_invoker`): scheduling primitives (this crate)
//! - **Layer 2** (`vow_core`): settlement cells and the resolution procedure
//! - **Layer 3** (`vow_combinators`): `all`, `race` and friends
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use vow_invoker::MicrotaskQueue;
//!
//! let queue = MicrotaskQueue::new();
//! let invoker = queue.invoker();
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&hits);
//! invoker.schedule(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! // Nothing runs until the host drains the queue.
//! assert_eq!(hits.load(Ordering::SeqCst), 0);
//! assert_eq!(queue.run_until_idle(), 1);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

/// The deferred invoker contract and handle.
pub mod invoker;

/// Host-drained FIFO microtask queue.
pub mod microtask;

/// Tokio-backed invoker.
pub mod runtime;

pub use invoker::{DeferredInvoker, Invoker, Task, panic_message};
pub use microtask::{MicrotaskQueue, QueueConfig};
pub use runtime::{InvokerError, TokioInvoker};
