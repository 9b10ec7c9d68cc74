//! Parallelism sizer (C4)
//!
//! Maps a skippability percentage and policy bounds to a worker count via
//! linear interpolation: a pipeline where nearly everything is skippable
//! should still spin up few nodes, a pipeline where nothing is skippable
//! should use the full fleet.

/// Computes the worker count for one plan.
///
/// `skippability` may fall outside `[0, 100]`; it is clamped before use.
/// See spec.md §4.1 and §9(a) for the `min > max` clamp decision.
pub fn compute_workers(skippability: f64, min_parallelism: i64, max_parallelism: i64) -> u32 {
    if max_parallelism <= 1 {
        return 1;
    }
    if min_parallelism < 1 {
        return 1;
    }

    let min_parallelism = min_parallelism.min(max_parallelism);

    let p = skippability.clamp(0.0, 100.0) / 100.0;
    let span = (max_parallelism - min_parallelism) as f64;
    let workers = (max_parallelism as f64) - p * span;

    workers.round().max(1.0) as u32
}
