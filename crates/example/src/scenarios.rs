//! Small promise programs shown by the `vow-demo` binary.

use core::time::Duration;
use tokio::time::Instant;
use vow::prelude::*;

/// Returns a promise fulfilled after `duration`, driven by a tokio timer.
///
/// Must be called from within a tokio runtime.
pub fn delay(invoker: &Invoker, duration: Duration) -> Promise<()> {
    Promise::new(invoker, move |resolve: Resolver<(), PromiseError>, _reject| {
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            resolve.fulfill(());
        });
        Ok(())
    })
}

/// A value passed untouched through an empty link, then logged.
pub fn pass_through(invoker: &Invoker, value: i64) -> Promise<i64> {
    Promise::fulfilled(invoker, value).chain().map(|value| {
        tracing::info!(value, "pass-through chain settled");
        value
    })
}

/// Measures how long a [`delay`] of `duration` takes to settle.
pub fn timed_delay(invoker: &Invoker, duration: Duration) -> Promise<Duration> {
    let started = Instant::now();
    delay(invoker, duration).map(move |()| {
        let elapsed = started.elapsed();
        tracing::info!(elapsed = ?elapsed, "delay settled");
        elapsed
    })
}

/// Races two timers of different lengths and reports the winner's label.
pub fn race_timers(invoker: &Invoker, fast: Duration, slow: Duration) -> Promise<&'static str> {
    let label = |duration, name: &'static str| delay(invoker, duration).map(move |()| name);
    race(
        invoker,
        [label(slow, "slow").into(), label(fast, "fast").into()],
    )
}
