//! Composition helpers for `vow` (Layer 3).
//!
//! Built entirely on the public [`Promise`](vow_core::Promise) API:
//!
//! - [`all`] - every value, in input order, or the first rejection
//! - [`all_settled`] - every outcome, in input order
//! - [`race`] - the first input to settle
//! - [`finally`] - cleanup on either outcome
//!
//! Inputs are [`Resolution`](vow_core::Resolution)s, so plain values, promises
//! and foreign thenables can be mixed.

/// `all` and `all_settled`.
pub mod gather;

/// `race`.
pub mod race;

/// `finally`.
pub mod finally;

pub use finally::finally;
pub use gather::{all, all_settled};
pub use race::race;
