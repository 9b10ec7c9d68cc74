//! testoptimizer - test-impact-aware parallelism planner and dispatcher
//!
//! Splits one CI run into two phases:
//!
//! - **plan**: discover tests, consult a test-impact-analysis service to
//!   find which ones are safe to skip, size and bin-pack the remainder into
//!   worker shards, and write the result to a Plan Directory.
//! - **run**: execute one node's (or the whole plan's) shard of tests,
//!   against the written plan, sequentially or in parallel.
//!
//! # Architecture
//!
//! - **Adapters** (`adapters`): platform, framework, TIA client and
//!   CI-provider traits, each resolved by name from a closed set.
//! - **Planning** (`planner`, `sizer`, `packer`): discovery orchestration,
//!   worker-count sizing, and first-fit-decreasing bin packing.
//! - **Plan Directory** (`plan`): the on-disk contract between `plan` and
//!   `run`, plus the TIA response cache.
//! - **Dispatch** (`dispatch`): executes a written plan across one or more
//!   local worker processes.

pub mod adapters;
pub mod cancel;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod packer;
pub mod pathnorm;
pub mod plan;
pub mod planner;
pub mod sizer;
pub mod state;
pub mod taskgroup;

/// Result type used throughout testoptimizer
pub type Result<T> = anyhow::Result<T>;
