//! Plan loader (C9)
//!
//! If `parallel-runners.txt` is absent, [`load_or_replan`] invokes the
//! Planner to produce it and its siblings before `run` dispatches anything
//! (spec.md §4.7). If present, it is parsed as a non-negative integer;
//! malformed content is a fatal [`PlanCorruption`] error — never guessed.

use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::error::PersistenceError;
use crate::error::PlanCorruption;
use crate::planner::{Planner, PlannerError, PlannerInputs};

use super::layout::PlanLayout;
use super::writer::write_plan;

/// Whether a replan is needed, or the parsed worker count if the plan is
/// already present.
#[derive(Debug)]
pub enum LoadOutcome {
    NeedsReplan,
    WorkerCount(u32),
}

/// Failure modes of [`load_or_replan`]: a corrupt existing plan, a planner
/// failure while computing a replacement, or a failure persisting it.
#[derive(Debug, thiserror::Error)]
pub enum LoadOrReplanError {
    #[error(transparent)]
    Corruption(#[from] PlanCorruption),
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Checks whether `parallel-runners.txt` exists and, if so, parses it.
pub fn check(layout: &PlanLayout) -> Result<LoadOutcome, PlanCorruption> {
    let path = layout.parallel_runners_txt();
    if !path.exists() {
        return Ok(LoadOutcome::NeedsReplan);
    }
    Ok(LoadOutcome::WorkerCount(parse_worker_count(&path)?))
}

/// Loads the existing plan's worker count, or — if `parallel-runners.txt`
/// (and its siblings) are missing — runs `planner` to produce one and
/// writes it to `layout` before returning its worker count (spec.md §4.7:
/// "When `run` starts, if `parallel-runners.txt` is absent, invoke the
/// Planner to produce it (and all siblings)").
pub async fn load_or_replan(
    layout: &PlanLayout,
    planner: &Planner,
    inputs: &PlannerInputs,
) -> Result<u32, LoadOrReplanError> {
    match check(layout)? {
        LoadOutcome::WorkerCount(n) => Ok(n),
        LoadOutcome::NeedsReplan => {
            info!(
                plan_dir = %layout.root().display(),
                "plan directory missing or incomplete; replanning before run"
            );
            let plan = planner.plan(inputs, layout).await?;
            write_plan(layout, &plan)?;
            Ok(plan.worker_count)
        }
    }
}

fn parse_worker_count(path: &PathBuf) -> Result<u32, PlanCorruption> {
    let content = fs::read_to_string(path).map_err(|_| PlanCorruption::MissingArtifact(path.clone()))?;
    let trimmed = content.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PlanCorruption::MalformedWorkerCount {
            path: path.clone(),
            content: content.clone(),
        });
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| PlanCorruption::MalformedWorkerCount {
            path: path.clone(),
            content: content.clone(),
        })
}

/// Reads one runner's assigned test files, one path per line. Empty lines
/// are ignored (spec.md §6).
pub fn read_runner_file(layout: &PlanLayout, index: u32) -> Result<Vec<PathBuf>, PlanCorruption> {
    let path = layout.runner_file(index);
    read_lines(&path)
}

/// Reads `test-files.txt`, the full surviving set.
pub fn read_test_files(layout: &PlanLayout) -> Result<Vec<PathBuf>, PlanCorruption> {
    read_lines(&layout.test_files_txt())
}

fn read_lines(path: &PathBuf) -> Result<Vec<PathBuf>, PlanCorruption> {
    let content = fs::read_to_string(path)
        .map_err(|_| PlanCorruption::MissingArtifact(path.clone()))?;
    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(PathBuf::from)
        .collect())
}
