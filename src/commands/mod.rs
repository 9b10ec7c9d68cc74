//! Command handlers
//!
//! Each submodule ties adapters, the planner or dispatcher, and the Plan
//! Directory together for one CLI subcommand. This is the only layer that
//! wraps typed component errors in `anyhow::Error` via `?`.

pub mod plan_cmd;
pub mod run_cmd;
