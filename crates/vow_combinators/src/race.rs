//! First-to-settle combinator.

use vow_core::{Promise, Reason, Resolution, Value};
use vow_invoker::Invoker;

/// Settles like whichever input settles first, in either direction.
///
/// Inputs are observed in order, so among inputs that are already settled
/// the earliest one wins. An empty input list stays pending forever.
pub fn race<T: Value, E: Reason>(
    invoker: &Invoker,
    inputs: impl IntoIterator<Item = Resolution<T, E>>,
) -> Promise<T, E> {
    let deferred = Promise::deferred(invoker);
    let mut count = 0usize;

    for input in inputs {
        count += 1;
        let resolver = deferred.resolver.clone();
        let rejecter = deferred.rejecter.clone();
        Promise::resolve(invoker, input).then(
            move |value| {
                resolver.fulfill(value);
                Ok(Resolution::Value(()))
            },
            move |reason| {
                rejecter.reject(reason);
                Ok(Resolution::Value(()))
            },
        );
    }

    tracing::trace!(promise = %deferred.promise.id(), inputs = count, "race");
    deferred.promise
}

#[cfg(test)]
mod tests {
    use super::*;
    use vow_core::{PromiseError, PromiseState};
    use vow_invoker::MicrotaskQueue;

    #[test]
    fn empty_race_stays_pending() {
        let queue = MicrotaskQueue::new();

        let raced = race::<u8, PromiseError>(&queue.invoker(), []);

        queue.run_until_idle();
        assert_eq!(raced.state(), PromiseState::Pending);
    }

    #[test]
    fn earliest_settled_input_wins() {
        let queue = MicrotaskQueue::new();
        let invoker = queue.invoker();
        let pending = Promise::<u8>::deferred(&invoker);

        let raced = race(
            &invoker,
            [
                pending.promise.clone().into(),
                Promise::reject(&invoker, PromiseError::rejected("second")).into(),
                Resolution::Value(3),
            ],
        );
        queue.run_until_idle();
        pending.resolver.fulfill(1);
        queue.run_until_idle();

        assert_eq!(raced.peek(), Some(Err(PromiseError::rejected("second"))));
    }
}
