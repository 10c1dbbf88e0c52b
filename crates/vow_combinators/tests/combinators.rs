//! Integration tests for the composition helpers on a tokio host.
//!
//! Timer-backed inputs settle out of order; results must still follow input
//! order (`all`) or settlement time (`race`).

mod test_utils;

use core::time::Duration;
use serde_json::{Value as Json, json};
use test_utils::{after, fail_after, tokio_invoker};
use vow_combinators::{all, all_settled, finally, race};
use vow_core::{Promise, PromiseError, Resolution};

// ═══════════════════════════════════════════════════════════════════════════════
// ALL
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn all_preserves_input_order() {
    let invoker = tokio_invoker();

    let joined = all(
        &invoker,
        [
            Promise::resolve(&invoker, Resolution::Value(json!(3))).into(),
            Resolution::Value(json!(42)),
            after(&invoker, Duration::from_millis(100), json!("foo")).into(),
        ],
    );

    assert_eq!(joined.await, Ok(vec![json!(3), json!(42), json!("foo")]));
}

#[tokio::test]
async fn all_ignores_completion_order() {
    let invoker = tokio_invoker();

    let joined = all(
        &invoker,
        [
            after(&invoker, Duration::from_millis(60), "slow").into(),
            after(&invoker, Duration::from_millis(5), "fast").into(),
            after(&invoker, Duration::from_millis(30), "middle").into(),
        ],
    );

    assert_eq!(joined.await, Ok(vec!["slow", "fast", "middle"]));
}

#[tokio::test]
async fn all_rejects_with_first_failure_in_time() {
    let invoker = tokio_invoker();

    let joined = all(
        &invoker,
        [
            fail_after::<Json>(&invoker, Duration::from_millis(80), "late").into(),
            after(&invoker, Duration::from_millis(10), json!(1)).into(),
            fail_after(&invoker, Duration::from_millis(20), "early").into(),
        ],
    );

    assert_eq!(joined.await, Err(PromiseError::rejected("early")));
}

#[tokio::test]
async fn all_settled_reports_every_outcome() {
    let invoker = tokio_invoker();

    let settled = all_settled(
        &invoker,
        [
            fail_after::<u8>(&invoker, Duration::from_millis(20), "nope").into(),
            after(&invoker, Duration::from_millis(10), 2).into(),
        ],
    );

    assert_eq!(
        settled.await,
        Ok(vec![Err(PromiseError::rejected("nope")), Ok(2)])
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// RACE
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn race_settles_with_first_to_finish() {
    let invoker = tokio_invoker();

    let raced = race(
        &invoker,
        [
            after(&invoker, Duration::from_millis(500), "one").into(),
            after(&invoker, Duration::from_millis(100), "two").into(),
        ],
    );

    assert_eq!(raced.await, Ok("two"));
}

#[tokio::test]
async fn race_settles_with_first_rejection() {
    let invoker = tokio_invoker();

    let raced = race(
        &invoker,
        [
            after(&invoker, Duration::from_millis(200), "value").into(),
            fail_after(&invoker, Duration::from_millis(20), "failure").into(),
        ],
    );

    assert_eq!(raced.await, Err(PromiseError::rejected("failure")));
}

// ═══════════════════════════════════════════════════════════════════════════════
// FINALLY
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn finally_runs_after_a_timer() {
    let invoker = tokio_invoker();
    let (sender, receiver) = tokio::sync::oneshot::channel();

    let cleaned = finally(&after(&invoker, Duration::from_millis(10), 5u32), move || {
        sender
            .send(())
            .map_err(|()| PromiseError::rejected("receiver dropped"))?;
        Ok(Resolution::Value(()))
    });

    assert_eq!(cleaned.await, Ok(5));
    assert!(receiver.await.is_ok());
}

#[tokio::test]
async fn finally_waits_for_async_cleanup() {
    let invoker = tokio_invoker();
    let flushed = after(&invoker, Duration::from_millis(40), ());
    let cleanup = flushed.clone();

    let cleaned = finally(&after(&invoker, Duration::from_millis(5), "body"), move || {
        Ok(Resolution::Promise(cleanup))
    });

    assert_eq!(cleaned.await, Ok("body"));
    assert!(flushed.peek().is_some());
}

#[tokio::test]
async fn finally_cleanup_rejection_wins() {
    let invoker = tokio_invoker();
    let cleanup = fail_after::<()>(&invoker, Duration::from_millis(20), "flush failed");

    let cleaned = finally(&after(&invoker, Duration::from_millis(5), 1u8), move || {
        Ok(Resolution::Promise(cleanup))
    });

    assert_eq!(cleaned.await, Err(PromiseError::rejected("flush failed")));
}
