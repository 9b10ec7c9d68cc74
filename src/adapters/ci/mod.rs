//! CI-provider adapter contract (C3)

pub mod github;

use std::path::Path;

use crate::error::{CiProviderError, ConfigError};

/// Writes one file consumed by a CI system's own configuration syntax,
/// given the worker count the planner settled on.
pub trait CiProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// `worker_count == 0` must be rejected with
    /// [`CiProviderError::NonPositiveWorkerCount`].
    fn configure(&self, plan_dir: &Path, worker_count: u32) -> Result<(), CiProviderError>;
}

/// Resolves a `--ci-provider` value to a concrete adapter.
pub fn resolve(name: &str) -> Result<Box<dyn CiProvider>, ConfigError> {
    match name {
        "github" => Ok(Box::new(github::GithubActionsProvider)),
        other => Err(ConfigError::UnknownCiProvider(other.to_string())),
    }
}
