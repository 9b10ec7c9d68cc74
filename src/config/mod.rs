//! Configuration module
//!
//! Handles CLI argument parsing (`cli`) and its translation into the typed
//! inputs the rest of the crate consumes (`validator`).

pub mod cli;
pub mod validator;

use tracing_subscriber::EnvFilter;

/// Initialises the global `tracing` subscriber from `--log-level`/`RUST_LOG`.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
