//! The settlement cell.
//!
//! A [`Promise`] is a cheap handle onto a shared cell that moves from
//! [`PromiseState::Pending`] to a terminal state exactly once. While pending,
//! the cell collects reactions; the transition drains them.
//!
//! # State machine
//!
//! ```text
//!              ┌──────────── fulfil ───────────▶ Fulfilled(T)
//!   Pending ───┤
//!              └──────────── reject ───────────▶ Rejected(E)
//! ```
//!
//! Any settle attempt on a terminal cell is ignored.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use vow_invoker::{Invoker, panic_message};

use crate::capability::{Deferred, Rejecter, Resolver, capabilities};
use crate::error::{PromiseError, Reason, Value};
use crate::handler::Reaction;
use crate::resolution::Resolution;

// ─────────────────────────────────────────────────────────────────────────────
// PromiseId / PromiseState
// ─────────────────────────────────────────────────────────────────────────────

/// Process-unique identifier of a promise cell, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PromiseId(u64);

impl PromiseId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn index(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PromiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "promise_{}", self.0)
    }
}

/// Lifecycle state of a promise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromiseState {
    /// Not settled yet.
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with a reason.
    Rejected,
}

impl fmt::Display for PromiseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromiseState::Pending => f.write_str("pending"),
            PromiseState::Fulfilled => f.write_str("fulfilled"),
            PromiseState::Rejected => f.write_str("rejected"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cell
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) enum State<T, E> {
    /// Reactions in registration order.
    Pending(Vec<Reaction<T, E>>),
    Settled(Result<T, E>),
}

struct Cell<T, E> {
    id: PromiseId,
    invoker: Invoker,
    state: Mutex<State<T, E>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Promise
// ─────────────────────────────────────────────────────────────────────────────

/// A single-assignment container for a value of type `T` or a reason of
/// type `E`.
///
/// Promises are created with an initializer ([`Promise::new`]), from an
/// externally settled [`Deferred`], or by registering observers on another
/// promise ([`then`](Promise::then) and friends). Cloning a `Promise` clones
/// the handle, not the cell.
///
/// # Example
///
/// ```
/// use vow_core::{Promise, PromiseError, Resolution};
/// use vow_invoker::MicrotaskQueue;
///
/// let queue = MicrotaskQueue::new();
/// let invoker = queue.invoker();
///
/// let doubled: Promise<i32> = Promise::new(&invoker, |resolve, _reject| {
///     resolve.fulfill(21);
///     Ok(())
/// })
/// .map(|value| value * 2);
///
/// queue.run_until_idle();
/// assert_eq!(doubled.peek(), Some(Ok(42)));
/// ```
pub struct Promise<T, E = PromiseError> {
    cell: Arc<Cell<T, E>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("id", &self.cell.id)
            .field("state", &self.state())
            .finish()
    }
}

impl<T, E> Promise<T, E> {
    /// Returns this promise's identifier.
    #[must_use]
    pub fn id(&self) -> PromiseId {
        self.cell.id
    }

    /// Returns the invoker this promise dispatches callbacks through.
    #[must_use]
    pub fn invoker(&self) -> &Invoker {
        &self.cell.invoker
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PromiseState {
        match &*self.cell.state.lock() {
            State::Pending(_) => PromiseState::Pending,
            State::Settled(Ok(_)) => PromiseState::Fulfilled,
            State::Settled(Err(_)) => PromiseState::Rejected,
        }
    }

    /// Returns `true` while the promise has not settled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == PromiseState::Pending
    }

    /// Returns `true` if both handles refer to the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    /// Number of reactions waiting for this promise to settle.
    #[must_use]
    pub fn waiting(&self) -> usize {
        match &*self.cell.state.lock() {
            State::Pending(reactions) => reactions.len(),
            State::Settled(_) => 0,
        }
    }
}

impl<T: Value, E: Reason> Promise<T, E> {
    /// Creates a pending promise with no capabilities attached.
    pub(crate) fn pending(invoker: &Invoker) -> Self {
        Self {
            cell: Arc::new(Cell {
                id: PromiseId::next(),
                invoker: invoker.clone(),
                state: Mutex::new(State::Pending(Vec::new())),
            }),
        }
    }

    /// Creates a promise and runs `initializer` synchronously with its
    /// settle capabilities.
    ///
    /// The first call to either capability wins. If the initializer returns
    /// `Err` or panics before settling the promise, the promise is rejected
    /// with that error (a panic becomes [`PromiseError::InitializerPanicked`]).
    /// Failures after a successful settle call are ignored.
    pub fn new<F>(invoker: &Invoker, initializer: F) -> Self
    where
        F: FnOnce(Resolver<T, E>, Rejecter<T, E>) -> Result<(), E>,
    {
        let promise = Self::pending(invoker);
        let (resolver, rejecter) = capabilities(&promise);
        let fallback = rejecter.clone();

        match catch_unwind(AssertUnwindSafe(move || initializer(resolver, rejecter))) {
            Ok(Ok(())) => {}
            Ok(Err(reason)) => {
                if !fallback.reject(reason) {
                    tracing::debug!(
                        promise = %promise.id(),
                        "initializer error after settlement ignored"
                    );
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(promise = %promise.id(), panic = %message, "promise initializer panicked");
                if !fallback.reject(PromiseError::InitializerPanicked(message).into()) {
                    tracing::debug!(
                        promise = %promise.id(),
                        "initializer panic after settlement ignored"
                    );
                }
            }
        }
        promise
    }

    /// Creates a pending promise together with its settle capabilities.
    #[must_use]
    pub fn deferred(invoker: &Invoker) -> Deferred<T, E> {
        let promise = Self::pending(invoker);
        let (resolver, rejecter) = capabilities(&promise);
        Deferred {
            promise,
            resolver,
            rejecter,
        }
    }

    /// Returns a promise resolved with `resolution`.
    ///
    /// A [`Resolution::Promise`] is returned as is; values and thenables are
    /// wrapped in a new promise.
    pub fn resolve(invoker: &Invoker, resolution: Resolution<T, E>) -> Self {
        match resolution {
            Resolution::Promise(promise) => promise,
            other => {
                let promise = Self::pending(invoker);
                promise.resolve_with(other);
                promise
            }
        }
    }

    /// Returns a promise fulfilled with `value`.
    pub fn fulfilled(invoker: &Invoker, value: T) -> Self {
        Self::resolve(invoker, Resolution::Value(value))
    }

    /// Returns a promise rejected with `reason`.
    pub fn reject(invoker: &Invoker, reason: E) -> Self {
        let promise = Self::pending(invoker);
        promise.reject_with(reason);
        promise
    }

    /// Returns a clone of the settled outcome, or `None` while pending.
    #[must_use]
    pub fn peek(&self) -> Option<Result<T, E>> {
        match &*self.cell.state.lock() {
            State::Pending(_) => None,
            State::Settled(outcome) => Some(outcome.clone()),
        }
    }

    /// Moves this cell and every cell adopting it to a terminal state.
    ///
    /// Adoption links are followed through a work queue rather than
    /// recursion, so long adoption chains settle in constant stack depth.
    pub(crate) fn settle(&self, outcome: Result<T, E>) {
        let mut work = VecDeque::from([(self.clone(), outcome)]);
        while let Some((promise, outcome)) = work.pop_front() {
            for outer in promise.transition(&outcome) {
                work.push_back((outer, outcome.clone()));
            }
        }
    }

    /// Stores `outcome` if the cell is pending, schedules the handlers that
    /// were waiting on it and returns the promises that adopted it.
    ///
    /// Handlers are handed to the invoker before the lock is released, so a
    /// registration racing with the transition is always scheduled after
    /// them. Scheduling never runs a task inline.
    fn transition(&self, outcome: &Result<T, E>) -> Vec<Promise<T, E>> {
        let mut state = self.cell.state.lock();
        if matches!(*state, State::Settled(_)) {
            return Vec::new();
        }
        let State::Pending(reactions) =
            core::mem::replace(&mut *state, State::Settled(outcome.clone()))
        else {
            return Vec::new();
        };
        tracing::trace!(
            promise = %self.id(),
            fulfilled = outcome.is_ok(),
            reactions = reactions.len(),
            "promise settled"
        );

        let mut adopters = Vec::new();
        for reaction in reactions {
            match reaction {
                Reaction::Handler(handler) => handler.dispatch(outcome.clone(), self.invoker()),
                Reaction::Adopt(outer) => adopters.push(outer),
            }
        }
        adopters
    }

    /// Queues `reaction` while pending, or runs it against the settled
    /// outcome right away.
    pub(crate) fn register(&self, reaction: Reaction<T, E>) {
        let mut state = self.cell.state.lock();
        let outcome = match &mut *state {
            State::Pending(reactions) => {
                reactions.push(reaction);
                return;
            }
            State::Settled(outcome) => outcome.clone(),
        };
        match reaction {
            // Scheduled under the lock, behind any handlers the transition
            // scheduled.
            Reaction::Handler(handler) => handler.dispatch(outcome, self.invoker()),
            Reaction::Adopt(outer) => {
                drop(state);
                outer.settle(outcome);
            }
        }
    }
}
