//! Property-based tests for settlement and dispatch order.
//!
//! `proptest` generates sequences of settle attempts and handler counts; the
//! microtask host makes every run deterministic.


use proptest::prelude::*;
use test_utils::EventLog;
use vow_core::{Promise, PromiseError};
use vow_invoker::MicrotaskQueue;

/// One call made against a promise's capabilities.
#[derive(Clone, Debug)]
enum Attempt {
    Fulfill(i32),
    Reject(String),
}

fn arb_attempt() -> impl Strategy<Value = Attempt> {
    prop_oneof![
        any::<i32>().prop_map(Attempt::Fulfill),
        "[a-z]{1,8}".prop_map(Attempt::Reject),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// However many settle attempts are made, only the first one counts.
    #[test]
    fn first_settle_attempt_wins(attempts in prop::collection::vec(arb_attempt(), 1..16)) {
        let queue = MicrotaskQueue::new();
        let deferred = Promise::<i32>::deferred(&queue.invoker());

        let accepted: Vec<bool> = attempts
            .iter()
            .map(|attempt| match attempt {
                Attempt::Fulfill(value) => deferred.resolver.fulfill(*value),
                Attempt::Reject(reason) => deferred.rejecter.reject(PromiseError::rejected(reason.as_str())),
            })
            .collect();

        prop_assert!(accepted[0]);
        prop_assert!(accepted[1..].iter().all(|won| !won));
        let expected = match &attempts[0] {
            Attempt::Fulfill(value) => Ok(*value),
            Attempt::Reject(reason) => Err(PromiseError::rejected(reason.as_str())),
        };
        prop_assert_eq!(deferred.promise.peek(), Some(expected));
    }

    /// Handlers fire in registration order whether they were registered
    /// before or after settlement.
    #[test]
    fn handlers_fire_in_registration_order(before in 0..20usize, after in 0..20usize) {
        let queue = MicrotaskQueue::new();
        let deferred = Promise::<usize>::deferred(&queue.invoker());
        let log = EventLog::new();

        let register = |n: usize| {
            let log = log.clone();
            deferred.promise.map(move |_| log.push(n.to_string()));
        };
        (0..before).for_each(&register);
        deferred.resolver.fulfill(0);
        (before..before + after).for_each(&register);

        prop_assert!(log.is_empty());
        queue.run_until_idle();

        let expected: Vec<String> = (0..before + after).map(|n| n.to_string()).collect();
        prop_assert_eq!(log.events(), expected);
    }
}
