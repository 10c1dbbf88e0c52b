//! Shared test utilities for `vow_combinators` integration tests.
//!
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities; not all items used in every test binary"
)]

use core::time::Duration;
use vow_core::{Promise, PromiseError, Rejecter, Resolver};
use vow_invoker::{Invoker, TokioInvoker};

/// Returns an invoker for the current tokio runtime.
pub fn tokio_invoker() -> Invoker {
    TokioInvoker::current().expect("runtime").invoker()
}

/// Returns a promise fulfilled with `value` after `delay` on the current
/// tokio runtime.
pub fn after<T: Clone + Send + 'static>(invoker: &Invoker, delay: Duration, value: T) -> Promise<T> {
    Promise::new(invoker, move |resolve: Resolver<T, PromiseError>, _reject| {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            resolve.fulfill(value);
        });
        Ok(())
    })
}

/// Returns a promise rejected with `reason` after `delay` on the current
/// tokio runtime.
pub fn fail_after<T: Clone + Send + 'static>(
    invoker: &Invoker,
    delay: Duration,
    reason: &str,
) -> Promise<T> {
    let reason = PromiseError::rejected(reason);
    Promise::new(invoker, move |_resolve, reject: Rejecter<T, PromiseError>| {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            reject.reject(reason);
        });
        Ok(())
    })
}
