//! Demo scenarios for `vow`.
//!
//! - [`config`] - Demo settings read from the environment, plus subscriber setup
//! - [`scenarios`] - Small promise programs run by the `vow-demo` binary

/// Demo configuration and tracing setup.
pub mod config;

/// Demo promise programs.
pub mod scenarios;

pub use config::{ConfigError, DemoConfig, LogFormat};
