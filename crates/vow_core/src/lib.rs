//! Settlement cells for `vow` (Layer 2).
//!
//! A [`Promise`] holds either nothing yet, a value, or a reason, and moves
//! out of the pending state exactly once. Observers registered with
//! [`then`](Promise::then) each get a new dependent promise and are run
//! through the promise's [`Invoker`](vow_invoker::Invoker), never
//! synchronously.
//!
//! - [`promise`] - The cell, its state machine and factories
//! - [`capability`] - [`Resolver`] / [`Rejecter`] pairs and [`Deferred`]
//! - [`resolution`] - The resolution procedure and foreign [`Thenable`]s
//! - [`handler`] - Observer registration and dispatch
//! - [`settlement`] - Awaiting a promise as a [`Future`](core::future::Future)
//!
//! # Example
//!
//! ```
//! use vow_core::{Promise, Resolution};
//! use vow_invoker::MicrotaskQueue;
//!
//! let queue = MicrotaskQueue::new();
//! let invoker = queue.invoker();
//!
//! let inner: Promise<i32> = Promise::fulfilled(&invoker, 5);
//! let outer: Promise<i32> = Promise::new(&invoker, |resolve, _reject| {
//!     resolve.resolve(Resolution::Promise(inner));
//!     Ok(())
//! });
//! let doubled = outer.and_then(|value| Ok(Resolution::Value(value * 2)));
//!
//! queue.run_until_idle();
//! assert_eq!(doubled.peek(), Some(Ok(10)));
//! ```

/// Settle capabilities.
pub mod capability;

/// Error types and payload bounds.
pub mod error;

/// Observer registration.
pub mod handler;

/// The settlement cell.
pub mod promise;

/// The resolution procedure.
pub mod resolution;

/// Future bridge.
pub mod settlement;

pub use capability::{Deferred, Rejecter, Resolver};
pub use error::{PromiseError, Reason, Value};
pub use promise::{Promise, PromiseId, PromiseState};
pub use resolution::{Resolution, Thenable};
pub use settlement::Settlement;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::{
        Deferred, Promise, PromiseError, PromiseState, Reason, Rejecter, Resolution, Resolver,
        Thenable, Value,
    };
}
