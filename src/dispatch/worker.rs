//! One dispatcher-spawned worker
//!
//! State machine: `Pending -> Starting -> Running -> (Success | Failed |
//! Cancelled)`, as named in spec.md §4.6. The state itself is only observed
//! within one worker's lifetime here — the dispatcher aggregates outcomes
//! through [`crate::taskgroup::TaskGroup`], not by polling worker state.

use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::framework::Framework;
use crate::cancel::CancellationToken;
use crate::error::DispatchError;
use crate::model::WorkerState;

/// Runs one worker's assigned test files through the framework adapter,
/// transitioning through [`WorkerState`] as it goes. `global_index` seeds
/// `{{nodeIndex}}` substitution (already applied to `env` by the caller)
/// and identifies this worker in error messages.
pub async fn run_worker(
    global_index: u32,
    files: Vec<PathBuf>,
    env: Vec<(String, String)>,
    command_override: Option<String>,
    framework: Arc<dyn Framework>,
    cancel: CancellationToken,
) -> Result<(), DispatchError> {
    let mut state = WorkerState::Starting;

    if files.is_empty() {
        state = WorkerState::Success;
        debug_assert!(state.is_terminal());
        return Ok(());
    }

    state = WorkerState::Running;
    tracing::debug!(global_index, ?state, "worker running");

    let outcome = framework
        .run_tests(&files, &env, command_override.as_deref(), &cancel)
        .await;

    let (state, result) = match outcome {
        Ok(()) => (WorkerState::Success, Ok(())),
        Err(e) if cancel.is_cancelled() => (
            WorkerState::Cancelled,
            Err(DispatchError::NonZeroExit {
                index: global_index,
                status: format!("cancelled: {e}"),
            }),
        ),
        Err(e) => (
            WorkerState::Failed,
            Err(DispatchError::NonZeroExit {
                index: global_index,
                status: e.to_string(),
            }),
        ),
    };

    debug_assert!(state.is_terminal());
    result
}
