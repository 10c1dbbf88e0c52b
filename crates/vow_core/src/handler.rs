//! Observer registration and handler dispatch.
//!
//! Every registration returns a new dependent promise and stores a handler
//! on the source promise. When the source settles (or right away, if it
//! already has), the handler is scheduled on the source's invoker. It never
//! runs inside the call that registered it or settled the source.
//!
//! | Method | `on_fulfilled` | `on_rejected` |
//! |--------|----------------|---------------|
//! | [`then`](Promise::then) | callback | callback |
//! | [`and_then`](Promise::and_then) | callback | pass-through |
//! | [`map`](Promise::map) | infallible callback | pass-through |
//! | [`catch`](Promise::catch) | pass-through | callback |
//! | [`chain`](Promise::chain) | pass-through | pass-through |
//!
//! A callback returns `Ok(resolution)` to resolve the dependent promise
//! (promises and thenables are flattened) or `Err(reason)` to reject it. A
//! panicking callback rejects the dependent promise with
//! [`PromiseError::CallbackPanicked`].

use std::panic::{AssertUnwindSafe, catch_unwind};

use vow_invoker::{Invoker, panic_message};

use crate::error::{PromiseError, Reason, Value};
use crate::promise::Promise;
use crate::resolution::Resolution;

type Callback<A, U, E> = Box<dyn FnOnce(A) -> Result<Resolution<U, E>, E> + Send>;

// ─────────────────────────────────────────────────────────────────────────────
// Reaction
// ─────────────────────────────────────────────────────────────────────────────

/// Something waiting on a pending promise.
pub(crate) enum Reaction<T, E> {
    /// A registered observer, dispatched through the invoker.
    Handler(Box<dyn Dispatch<T, E>>),
    /// A promise that adopted this one; settled in the same drain.
    Adopt(Promise<T, E>),
}

/// Type-erased observer of a settled outcome.
pub(crate) trait Dispatch<T, E>: Send {
    /// Schedules the observer to run with `outcome`.
    fn dispatch(self: Box<Self>, outcome: Result<T, E>, invoker: &Invoker);
}

// ─────────────────────────────────────────────────────────────────────────────
// Handler
// ─────────────────────────────────────────────────────────────────────────────

enum OnFulfilled<T, U, E> {
    Call(Callback<T, U, E>),
    /// Forwards the value unchanged; only constructed with `U = T`.
    PassThrough(fn(T) -> U),
}

struct Handler<T, U, E> {
    on_fulfilled: OnFulfilled<T, U, E>,
    on_rejected: Option<Callback<E, U, E>>,
    dependent: Promise<U, E>,
}

impl<T: Value, U: Value, E: Reason> Dispatch<T, E> for Handler<T, U, E> {
    fn dispatch(self: Box<Self>, outcome: Result<T, E>, invoker: &Invoker) {
        invoker.schedule(move || self.run(outcome));
    }
}

impl<T: Value, U: Value, E: Reason> Handler<T, U, E> {
    fn run(self, outcome: Result<T, E>) {
        let Self {
            on_fulfilled,
            on_rejected,
            dependent,
        } = self;

        match outcome {
            Ok(value) => match on_fulfilled {
                OnFulfilled::Call(callback) => invoke(&dependent, callback, value),
                OnFulfilled::PassThrough(forward) => {
                    dependent.resolve_with(Resolution::Value(forward(value)));
                }
            },
            Err(reason) => match on_rejected {
                Some(callback) => invoke(&dependent, callback, reason),
                None => dependent.reject_with(reason),
            },
        }
    }
}

fn invoke<A, U: Value, E: Reason>(dependent: &Promise<U, E>, callback: Callback<A, U, E>, arg: A) {
    match catch_unwind(AssertUnwindSafe(move || callback(arg))) {
        Ok(Ok(resolution)) => dependent.resolve_with(resolution),
        Ok(Err(reason)) => dependent.reject_with(reason),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!(promise = %dependent.id(), panic = %message, "promise callback panicked");
            dependent.reject_with(PromiseError::CallbackPanicked(message).into());
        }
    }
}

fn identity<T>(value: T) -> T {
    value
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

impl<T: Value, E: Reason> Promise<T, E> {
    /// Registers both callbacks and returns the promise they feed.
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
    /// let recovered = Promise::<i32>::reject(&invoker, PromiseError::rejected("offline"))
    ///     .then(
    ///         |value| Ok(Resolution::Value(value.to_string())),
    ///         |reason| Ok(Resolution::Value(format!("fallback after {reason}"))),
    ///     );
    ///
    /// queue.run_until_idle();
    /// assert_eq!(recovered.peek(), Some(Ok("fallback after offline".to_string())));
    /// ```
    pub fn then<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Promise<U, E>
    where
        U: Value,
        F: FnOnce(T) -> Result<Resolution<U, E>, E> + Send + 'static,
        R: FnOnce(E) -> Result<Resolution<U, E>, E> + Send + 'static,
    {
        self.observe(
            OnFulfilled::Call(Box::new(on_fulfilled)),
            Some(Box::new(on_rejected)),
        )
    }

    /// Registers a fulfillment callback; rejections pass through unchanged.
    pub fn and_then<U, F>(&self, on_fulfilled: F) -> Promise<U, E>
    where
        U: Value,
        F: FnOnce(T) -> Result<Resolution<U, E>, E> + Send + 'static,
    {
        self.observe(OnFulfilled::Call(Box::new(on_fulfilled)), None)
    }

    /// Transforms the fulfillment value; rejections pass through unchanged.
    pub fn map<U, F>(&self, f: F) -> Promise<U, E>
    where
        U: Value,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.and_then(move |value| Ok(Resolution::Value(f(value))))
    }

    /// Registers a rejection callback; values pass through unchanged.
    pub fn catch<R>(&self, on_rejected: R) -> Promise<T, E>
    where
        R: FnOnce(E) -> Result<Resolution<T, E>, E> + Send + 'static,
    {
        self.observe(
            OnFulfilled::PassThrough(identity::<T>),
            Some(Box::new(on_rejected)),
        )
    }

    /// Returns a new promise that settles exactly like this one.
    pub fn chain(&self) -> Promise<T, E> {
        self.observe(OnFulfilled::PassThrough(identity::<T>), None)
    }

    fn observe<U: Value>(
        &self,
        on_fulfilled: OnFulfilled<T, U, E>,
        on_rejected: Option<Callback<E, U, E>>,
    ) -> Promise<U, E> {
        let dependent = Promise::pending(self.invoker());
        self.register(Reaction::Handler(Box::new(Handler {
            on_fulfilled,
            on_rejected,
            dependent: dependent.clone(),
        })));
        dependent
    }
}
