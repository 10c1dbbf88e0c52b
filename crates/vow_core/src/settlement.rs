//! Awaiting promises from async code.

use core::future::{Future, IntoFuture};
use core::pin::Pin;
use core::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::oneshot;
use vow_invoker::Invoker;

use crate::error::{PromiseError, Reason, Value};
use crate::handler::{Dispatch, Reaction};
use crate::promise::Promise;

/// Future resolving to a promise's outcome.
///
/// If the promise is dropped before it settles (every handle and capability
/// gone), the future resolves to [`PromiseError::Abandoned`].
///
/// # Example
///
/// ```
/// use vow_core::Promise;
/// use vow_invoker::TokioInvoker;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let invoker = TokioInvoker::current().unwrap().invoker();
/// let promise: Promise<i32> = Promise::fulfilled(&invoker, 5).map(|v| v + 1);
///
/// assert_eq!(promise.await, Ok(6));
/// # }
/// ```
#[must_use = "futures do nothing unless polled"]
#[derive(Debug)]
pub struct Settlement<T, E> {
    receiver: oneshot::Receiver<Result<T, E>>,
}

impl<T, E: From<PromiseError>> Future for Settlement<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.receiver.poll_unpin(cx).map(|received| match received {
            Ok(outcome) => outcome,
            Err(oneshot::Canceled) => Err(PromiseError::Abandoned.into()),
        })
    }
}

struct Notify<T, E> {
    sender: oneshot::Sender<Result<T, E>>,
}

impl<T: Value, E: Reason> Dispatch<T, E> for Notify<T, E> {
    fn dispatch(self: Box<Self>, outcome: Result<T, E>, _invoker: &Invoker) {
        // The receiver may already be gone; nothing to report then.
        let _ = self.sender.send(outcome);
    }
}

impl<T: Value, E: Reason> Promise<T, E> {
    /// Returns a future that completes with this promise's outcome.
    pub fn settlement(&self) -> Settlement<T, E> {
        let (sender, receiver) = oneshot::channel();
        self.register(Reaction::Handler(Box::new(Notify { sender })));
        Settlement { receiver }
    }
}

impl<T: Value, E: Reason> IntoFuture for Promise<T, E> {
    type Output = Result<T, E>;
    type IntoFuture = Settlement<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        self.settlement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vow_invoker::MicrotaskQueue;

    #[tokio::test]
    async fn settled_promise_completes_future() {
        let queue = MicrotaskQueue::new();
        let promise: Promise<&str> = Promise::fulfilled(&queue.invoker(), "ready");

        assert_eq!(promise.settlement().await, Ok("ready"));
    }

    #[tokio::test]
    async fn rejection_is_returned_as_err() {
        let queue = MicrotaskQueue::new();
        let promise: Promise<u8> = Promise::reject(&queue.invoker(), PromiseError::rejected("no"));

        assert_eq!(promise.await, Err(PromiseError::rejected("no")));
    }

    #[tokio::test]
    async fn dropped_promise_is_abandoned() {
        let queue = MicrotaskQueue::new();
        let deferred = Promise::<u8>::deferred(&queue.invoker());
        let settlement = deferred.promise.settlement();

        drop(deferred);

        assert_eq!(settlement.await, Err(PromiseError::Abandoned));
    }
}
