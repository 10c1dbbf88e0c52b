//! Settle capabilities.
//!
//! A [`Resolver`] and a [`Rejecter`] are always created as a pair sharing a
//! one-shot latch. Whichever capability claims the latch first settles the
//! promise; every later call to either one is ignored. The latch is separate
//! from the cell's own state because a promise that is adopting another
//! promise or a thenable stays pending after its resolver has been used.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Reason, Value};
use crate::promise::Promise;
use crate::resolution::Resolution;

/// One-shot flag shared by a resolver/rejecter pair.
#[derive(Clone, Default)]
struct Latch(Arc<AtomicBool>);

impl Latch {
    /// Returns `true` for the first caller only.
    fn claim(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn is_claimed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Creates a fresh resolver/rejecter pair for `promise`.
pub(crate) fn capabilities<T, E>(promise: &Promise<T, E>) -> (Resolver<T, E>, Rejecter<T, E>) {
    let latch = Latch::default();
    (
        Resolver {
            promise: promise.clone(),
            latch: latch.clone(),
        },
        Rejecter {
            promise: promise.clone(),
            latch,
        },
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolver
// ─────────────────────────────────────────────────────────────────────────────

/// The settle-as-success capability of a promise.
///
/// Resolving runs the resolution procedure: plain values fulfill the promise,
/// promises and thenables are adopted.
pub struct Resolver<T, E> {
    promise: Promise<T, E>,
    latch: Latch,
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            promise: self.promise.clone(),
            latch: self.latch.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("promise", &self.promise.id())
            .field("spent", &self.latch.is_claimed())
            .finish()
    }
}

impl<T: Value, E: Reason> Resolver<T, E> {
    /// Resolves the promise with `resolution`.
    ///
    /// Returns `false` if this pair of capabilities was already used.
    pub fn resolve(&self, resolution: Resolution<T, E>) -> bool {
        if !self.latch.claim() {
            tracing::debug!(promise = %self.promise.id(), "resolve ignored: already settled");
            return false;
        }
        self.promise.resolve_with(resolution);
        true
    }

    /// Fulfills the promise with a plain value.
    ///
    /// Returns `false` if this pair of capabilities was already used.
    pub fn fulfill(&self, value: T) -> bool {
        self.resolve(Resolution::Value(value))
    }

    /// Returns `true` once either capability of the pair has been used.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.latch.is_claimed()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rejecter
// ─────────────────────────────────────────────────────────────────────────────

/// The settle-as-failure capability of a promise.
pub struct Rejecter<T, E> {
    promise: Promise<T, E>,
    latch: Latch,
}

impl<T, E> Clone for Rejecter<T, E> {
    fn clone(&self) -> Self {
        Self {
            promise: self.promise.clone(),
            latch: self.latch.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Rejecter<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejecter")
            .field("promise", &self.promise.id())
            .field("spent", &self.latch.is_claimed())
            .finish()
    }
}

impl<T: Value, E: Reason> Rejecter<T, E> {
    /// Rejects the promise with `reason`.
    ///
    /// Returns `false` if this pair of capabilities was already used.
    pub fn reject(&self, reason: E) -> bool {
        if !self.latch.claim() {
            tracing::debug!(promise = %self.promise.id(), "reject ignored: already settled");
            return false;
        }
        self.promise.reject_with(reason);
        true
    }

    /// Returns `true` once either capability of the pair has been used.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.latch.is_claimed()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Deferred
// ─────────────────────────────────────────────────────────────────────────────

/// A pending promise bundled with its capabilities, for code that settles a
/// promise from outside an initializer.
///
/// # Example
///
/// ```
/// use vow_core::{Promise, PromiseState};
/// use vow_invoker::MicrotaskQueue;
///
/// let queue = MicrotaskQueue::new();
/// let deferred = Promise::<&str>::deferred(&queue.invoker());
///
/// assert_eq!(deferred.promise.state(), PromiseState::Pending);
/// assert!(deferred.resolver.fulfill("done"));
/// assert!(!deferred.rejecter.reject("too late".into()));
/// assert_eq!(deferred.promise.peek(), Some(Ok("done")));
/// ```
#[derive(Debug, Clone)]
pub struct Deferred<T, E> {
    /// The promise settled by the capabilities below.
    pub promise: Promise<T, E>,
    /// Settle-as-success capability.
    pub resolver: Resolver<T, E>,
    /// Settle-as-failure capability.
    pub rejecter: Rejecter<T, E>,
}
