//! Single-assignment promises with Promise/A+ resolution semantics.
//!
//! A [`Promise`](vow_core::Promise) settles exactly once, flattens nested
//! promises and foreign thenables, and runs every observer through an
//! injected [`DeferredInvoker`](vow_invoker::DeferredInvoker), never inline.
//!
//! ```
//! use vow::prelude::*;
//!
//! let queue = MicrotaskQueue::new();
//! let invoker = queue.invoker();
//!
//! let joined = all(
//!     &invoker,
//!     [
//!         Resolution::Promise(Promise::<i32>::fulfilled(&invoker, 3)),
//!         Resolution::Value(42),
//!     ],
//! );
//!
//! queue.run_until_idle();
//! assert_eq!(joined.peek(), Some(Ok(vec![3, 42])));
//! ```

pub use vow_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use vow_internal::prelude::*;
}
