//! The resolution procedure.
//!
//! Resolving a promise never stores a nested promise or thenable. The
//! [`Resolution`] handed to a resolver is classified first:
//!
//! | Resolution | Effect |
//! |------------|--------|
//! | [`Resolution::Value`] | fulfil immediately |
//! | [`Resolution::Promise`] (same cell) | reject with [`PromiseError::SelfResolution`] |
//! | [`Resolution::Promise`] (other cell) | adopt the other promise's eventual outcome |
//! | [`Resolution::Thenable`] | call its `then` with fresh, latched capabilities |
//!
//! Rejection reasons are never classified.

use core::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use vow_invoker::panic_message;

use crate::capability::{Rejecter, Resolver, capabilities};
use crate::error::{PromiseError, Reason, Value};
use crate::handler::Reaction;
use crate::promise::Promise;

// ─────────────────────────────────────────────────────────────────────────────
// Thenable
// ─────────────────────────────────────────────────────────────────────────────

/// A foreign deferred value whose outcome a promise can adopt.
///
/// `then` receives a resolver/rejecter pair for the adopting promise. Only
/// the first call among both capabilities has an effect. Returning `Err`
/// (or panicking) before either capability was called rejects the adopting
/// promise; afterwards the failure is ignored.
///
/// Closures with the matching signature are thenables.
///
/// # Example
///
/// ```
/// use vow_core::{Promise, Rejecter, Resolution, Resolver, Thenable, PromiseError};
/// use vow_invoker::MicrotaskQueue;
///
/// struct Ready(u32);
///
/// impl Thenable<u32, PromiseError> for Ready {
///     fn then(
///         self: Box<Self>,
///         resolve: Resolver<u32, PromiseError>,
///         _reject: Rejecter<u32, PromiseError>,
///     ) -> Result<(), PromiseError> {
///         resolve.fulfill(self.0);
///         Ok(())
///     }
/// }
///
/// let queue = MicrotaskQueue::new();
/// let promise: Promise<u32> = Promise::resolve(&queue.invoker(), Resolution::thenable(Ready(8)));
/// assert_eq!(promise.peek(), Some(Ok(8)));
/// ```
pub trait Thenable<T, E>: Send + 'static {
    /// Reports this value's outcome through the given capabilities.
    ///
    /// # Errors
    ///
    /// An error returned before either capability is called rejects the
    /// adopting promise.
    fn then(self: Box<Self>, resolve: Resolver<T, E>, reject: Rejecter<T, E>) -> Result<(), E>;
}

impl<T, E, F> Thenable<T, E> for F
where
    F: FnOnce(Resolver<T, E>, Rejecter<T, E>) -> Result<(), E> + Send + 'static,
{
    fn then(self: Box<Self>, resolve: Resolver<T, E>, reject: Rejecter<T, E>) -> Result<(), E> {
        (*self)(resolve, reject)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// What a promise is resolved with.
///
/// Callbacks registered with [`then`](Promise::then) return a `Resolution`,
/// so a callback can continue a chain with a plain value, another promise,
/// or a foreign thenable.
pub enum Resolution<T, E> {
    /// A plain value.
    Value(T),
    /// A promise whose outcome is adopted.
    Promise(Promise<T, E>),
    /// A foreign thenable whose outcome is adopted.
    Thenable(Box<dyn Thenable<T, E>>),
}

impl<T, E> Resolution<T, E> {
    /// Wraps a plain value.
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    /// Wraps a thenable.
    pub fn thenable(thenable: impl Thenable<T, E>) -> Self {
        Self::Thenable(Box::new(thenable))
    }
}

impl<T, E> From<Promise<T, E>> for Resolution<T, E> {
    fn from(promise: Promise<T, E>) -> Self {
        Self::Promise(promise)
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Resolution<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Resolution::Promise(promise) => f.debug_tuple("Promise").field(&promise.id()).finish(),
            Resolution::Thenable(_) => f.write_str("Thenable(..)"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Procedure
// ─────────────────────────────────────────────────────────────────────────────

impl<T: Value, E: Reason> Promise<T, E> {
    /// Runs the resolution procedure for `resolution` on this promise.
    pub(crate) fn resolve_with(&self, resolution: Resolution<T, E>) {
        if !self.is_pending() {
            return;
        }
        match resolution {
            Resolution::Value(value) => self.settle(Ok(value)),
            Resolution::Promise(inner) if inner.ptr_eq(self) => {
                tracing::debug!(promise = %self.id(), "promise resolved with itself");
                self.settle(Err(PromiseError::SelfResolution.into()));
            }
            Resolution::Promise(inner) => {
                tracing::trace!(promise = %self.id(), inner = %inner.id(), "adopting promise");
                inner.register(Reaction::Adopt(self.clone()));
            }
            Resolution::Thenable(thenable) => self.assimilate(thenable),
        }
    }

    /// Rejects this promise with `reason`; a no-op once settled.
    pub(crate) fn reject_with(&self, reason: E) {
        self.settle(Err(reason));
    }

    fn assimilate(&self, thenable: Box<dyn Thenable<T, E>>) {
        let (resolver, rejecter) = capabilities(self);
        let fallback = rejecter.clone();

        match catch_unwind(AssertUnwindSafe(move || thenable.then(resolver, rejecter))) {
            Ok(Ok(())) => {}
            Ok(Err(reason)) => {
                if !fallback.reject(reason) {
                    tracing::debug!(promise = %self.id(), "thenable error after settlement ignored");
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(promise = %self.id(), panic = %message, "thenable panicked");
                if !fallback.reject(PromiseError::ThenablePanicked(message).into()) {
                    tracing::debug!(promise = %self.id(), "thenable panic after settlement ignored");
                }
            }
        }
    }
}
