//! Group-wait concurrency primitive
//!
//! A minimal "error group": tasks are spawned onto the group, then
//! [`TaskGroup::wait`] awaits every one of them and returns the first error
//! encountered (by spawn order), after every peer has terminated. A worker
//! that panics is reported as [`crate::error::DispatchError::WorkerPanicked`]
//! rather than propagating the panic.
//!
//! Grounded in the pack's task-supervision code
//! (`open-telemetry-otel-arrow`'s controller task handles,
//! `seanchatmangpt-knhk::concurrency`), since the teacher drives at most one
//! node connection at a time and has no multi-task supervisor of its own.

use tokio::task::JoinHandle;

use crate::error::DispatchError;

pub struct TaskGroup {
    handles: Vec<JoinHandle<Result<(), DispatchError>>>,
}

impl TaskGroup {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Spawns `fut` onto the current tokio runtime as a member of this
    /// group. Spawn order is preserved for the first-error tie-break.
    pub fn spawn<F>(&mut self, fut: F)
    where
        F: std::future::Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        self.handles.push(tokio::spawn(fut));
    }

    /// Awaits every spawned task regardless of earlier failures, then
    /// returns the first error in spawn order, if any.
    pub async fn wait(self) -> Result<(), DispatchError> {
        let mut first_err = None;
        for (index, handle) in self.handles.into_iter().enumerate() {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(_join_err) => Err(DispatchError::WorkerPanicked {
                    index: index as u32,
                }),
            };
            if let Err(err) = outcome {
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}
