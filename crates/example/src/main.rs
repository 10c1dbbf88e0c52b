//! `vow` demo CLI.
//!
//! Runs two promise programs on a tokio host: a pass-through chain and a
//! timer-backed delay.
//!
//! # Usage
//!
//! ```bash
//! VOW_LOG_FORMAT=compact VOW_DEMO_DELAY_MS=500 vow-demo
//! ```

use example::DemoConfig;
use example::scenarios::{pass_through, race_timers, timed_delay};
use std::process::ExitCode;
use vow::prelude::*;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let config = match DemoConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    config.init_tracing();

    let invoker = match TokioInvoker::current() {
        Ok(host) => host.invoker(),
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let chained = pass_through(&invoker, 233);
    let timed = timed_delay(&invoker, config.delay);
    let raced = race_timers(&invoker, config.delay / 4, config.delay / 2);

    let outcomes = (chained.await, timed.await, raced.await);
    match outcomes {
        (Ok(value), Ok(elapsed), Ok(winner)) => {
            tracing::info!(value, elapsed = ?elapsed, winner, "demo finished");
            ExitCode::SUCCESS
        }
        (chained, timed, raced) => {
            tracing::error!(?chained, ?timed, ?raced, "demo failed");
            ExitCode::FAILURE
        }
    }
}
