//! Combinators that wait for every input.

use parking_lot::Mutex;
use std::sync::Arc;
use vow_core::{Promise, Reason, Resolution, Resolver, Value};
use vow_invoker::Invoker;

/// Per-index results collected as inputs settle.
struct Slots<T> {
    values: Vec<Option<T>>,
    remaining: usize,
}

impl<T> Slots<T> {
    fn new(len: usize) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self {
            values: (0..len).map(|_| None).collect(),
            remaining: len,
        }))
    }

    /// Stores `value` at `index` and returns every value, in input order,
    /// once the last slot is filled.
    fn fill(&mut self, index: usize, value: T) -> Option<Vec<T>> {
        if self.values[index].replace(value).is_none() {
            self.remaining -= 1;
        }
        if self.remaining > 0 {
            return None;
        }
        self.values.iter_mut().map(Option::take).collect()
    }
}

fn collect_inputs<T: Value, E: Reason>(
    invoker: &Invoker,
    inputs: impl IntoIterator<Item = Resolution<T, E>>,
) -> Vec<Promise<T, E>> {
    inputs
        .into_iter()
        .map(|input| Promise::resolve(invoker, input))
        .collect()
}

fn deliver<U: Value, E: Reason>(
    slots: &Mutex<Slots<U>>,
    resolver: &Resolver<Vec<U>, E>,
    index: usize,
    value: U,
) {
    // Resolve outside the lock.
    let complete = slots.lock().fill(index, value);
    if let Some(values) = complete {
        resolver.fulfill(values);
    }
}

/// Fulfills with every input's value, in input order, once all inputs have
/// fulfilled. Rejects with the first rejection observed.
///
/// Plain values count as already-fulfilled inputs. An empty input list
/// fulfills with an empty `Vec`.
///
/// # Example
///
/// ```
/// use vow_combinators::all;
/// use vow_core::{Promise, Resolution};
/// use vow_invoker::MicrotaskQueue;
///
/// let queue = MicrotaskQueue::new();
/// let invoker = queue.invoker();
///
/// let joined = all(
///     &invoker,
///     [
///         Resolution::Promise(Promise::<i32>::fulfilled(&invoker, 1)),
///         Resolution::Value(2),
///     ],
/// );
///
/// queue.run_until_idle();
/// assert_eq!(joined.peek(), Some(Ok(vec![1, 2])));
/// ```
pub fn all<T: Value, E: Reason>(
    invoker: &Invoker,
    inputs: impl IntoIterator<Item = Resolution<T, E>>,
) -> Promise<Vec<T>, E> {
    let inputs = collect_inputs(invoker, inputs);
    let deferred = Promise::deferred(invoker);
    tracing::trace!(promise = %deferred.promise.id(), inputs = inputs.len(), "all");

    if inputs.is_empty() {
        deferred.resolver.fulfill(Vec::new());
        return deferred.promise;
    }

    let slots = Slots::new(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let slots = Arc::clone(&slots);
        let resolver = deferred.resolver.clone();
        let rejecter = deferred.rejecter.clone();
        input.then(
            move |value| {
                deliver(&slots, &resolver, index, value);
                Ok(Resolution::Value(()))
            },
            move |reason| {
                rejecter.reject(reason);
                Ok(Resolution::Value(()))
            },
        );
    }
    deferred.promise
}

/// Fulfills with every input's outcome, in input order, once all inputs have
/// settled. Never rejects.
pub fn all_settled<T: Value, E: Reason>(
    invoker: &Invoker,
    inputs: impl IntoIterator<Item = Resolution<T, E>>,
) -> Promise<Vec<Result<T, E>>, E> {
    let inputs = collect_inputs(invoker, inputs);
    let deferred = Promise::deferred(invoker);
    tracing::trace!(promise = %deferred.promise.id(), inputs = inputs.len(), "all_settled");

    if inputs.is_empty() {
        deferred.resolver.fulfill(Vec::new());
        return deferred.promise;
    }

    let slots = Slots::new(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let on_value = (Arc::clone(&slots), deferred.resolver.clone());
        let on_reason = (Arc::clone(&slots), deferred.resolver.clone());
        input.then(
            move |value| {
                deliver(&on_value.0, &on_value.1, index, Ok(value));
                Ok(Resolution::Value(()))
            },
            move |reason| {
                deliver(&on_reason.0, &on_reason.1, index, Err(reason));
                Ok(Resolution::Value(()))
            },
        );
    }
    deferred.promise
}

#[cfg(test)]
mod tests {
    use super::*;
    use vow_core::PromiseError;
    use vow_invoker::MicrotaskQueue;

    #[test]
    fn slots_report_completion_once() {
        let slots = Slots::new(2);
        let mut slots = slots.lock();

        assert_eq!(slots.fill(1, "b"), None);
        assert_eq!(slots.fill(0, "a"), Some(vec!["a", "b"]));
    }

    #[test]
    fn empty_all_fulfills_with_empty_list() {
        let queue = MicrotaskQueue::new();

        let joined = all::<i32, PromiseError>(&queue.invoker(), []);

        assert_eq!(joined.peek(), Some(Ok(Vec::new())));
    }

    #[test]
    fn all_rejects_with_first_observed_failure() {
        let queue = MicrotaskQueue::new();
        let invoker = queue.invoker();
        let slow = Promise::<i32>::deferred(&invoker);
        let fast = Promise::<i32>::deferred(&invoker);

        let joined = all(
            &invoker,
            [slow.promise.clone().into(), fast.promise.clone().into()],
        );
        fast.rejecter.reject(PromiseError::rejected("fast"));
        queue.run_until_idle();
        slow.rejecter.reject(PromiseError::rejected("slow"));
        queue.run_until_idle();

        assert_eq!(joined.peek(), Some(Err(PromiseError::rejected("fast"))));
    }

    #[test]
    fn all_settled_keeps_both_outcomes_in_order() {
        let queue = MicrotaskQueue::new();
        let invoker = queue.invoker();

        let settled = all_settled(
            &invoker,
            [
                Promise::<i32>::reject(&invoker, PromiseError::rejected("no")).into(),
                Resolution::Value(4),
            ],
        );

        queue.run_until_idle();
        assert_eq!(
            settled.peek(),
            Some(Ok(vec![Err(PromiseError::rejected("no")), Ok(4)]))
        );
    }
}
