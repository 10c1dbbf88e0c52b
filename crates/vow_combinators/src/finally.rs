//! Cleanup that runs on either outcome.

use vow_core::{Promise, Reason, Resolution, Value};

/// Runs `on_settled` once `promise` settles, then passes the original outcome
/// through unchanged.
///
/// The cleanup may return a promise or thenable; the outcome is held back
/// until it settles. If the cleanup returns `Err` or its promise rejects,
/// that reason replaces the outcome.
///
/// # Example
///
/// ```
/// use vow_combinators::finally;
/// use vow_core::{Promise, PromiseError, Resolution};
/// use vow_invoker::MicrotaskQueue;
///
/// let queue = MicrotaskQueue::new();
/// let failed: Promise<u8> = Promise::reject(&queue.invoker(), PromiseError::rejected("io"));
///
/// let cleaned = finally(&failed, || Ok(Resolution::Value(())));
///
/// queue.run_until_idle();
/// assert_eq!(cleaned.peek(), Some(Err(PromiseError::rejected("io"))));
/// ```
pub fn finally<T, E, F>(promise: &Promise<T, E>, on_settled: F) -> Promise<T, E>
where
    T: Value,
    E: Reason,
    F: FnOnce() -> Result<Resolution<(), E>, E> + Send + 'static,
{
    let invoker = promise.invoker().clone();
    promise
        .then(
            |value| Ok(Resolution::Value(Ok(value))),
            |reason| Ok(Resolution::Value(Err(reason))),
        )
        .and_then(move |outcome: Result<T, E>| {
            let cleanup = Promise::resolve(&invoker, on_settled()?);
            Ok(Resolution::Promise(
                cleanup.and_then(move |()| outcome.map(Resolution::Value)),
            ))
        })
}
