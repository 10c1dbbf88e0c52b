//! # Vow Internal Library
//!
//! Re-exports the layered `vow` crates for convenience.

/// Layer 1: deferred invokers.
pub use vow_invoker;

/// Layer 2: settlement cells and the resolution procedure.
pub use vow_core;

/// Layer 3: composition helpers.
pub use vow_combinators;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use vow_combinators::{all, all_settled, finally, race};
    pub use vow_core::prelude::*;
    pub use vow_invoker::{DeferredInvoker, Invoker, MicrotaskQueue, TokioInvoker};
}
