//! Dispatcher (C8)
//!
//! Executes a plan in one of three modes (spec.md §4.6):
//!
//! - **Sequential** (`n <= 1`, no CI node index): run all of `test-files.txt`
//!   as one worker.
//! - **ParallelLocal** (`n > 1`, no CI node index): spawn one worker per
//!   `tests-split/runner-k`, concurrently, on this host.
//! - **AssignedSlice** (CI node index set): run only this node's slice,
//!   optionally sub-sharded across `ci-node-workers` local workers with
//!   global indices `idx * NODE_INDEX_MULTIPLIER + j`.

pub mod env_template;
pub mod worker;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::adapters::framework::Framework;
use crate::cancel::CancellationToken;
use crate::error::DispatchError;
use crate::model::{RunMode, WorkerEnv};
use crate::plan::{layout::PlanLayout, loader};
use crate::taskgroup::TaskGroup;

/// Fixed integer folding a CI-node index and a local sub-worker index into
/// one globally unique worker index (spec.md's GLOSSARY: "node-index
/// multiplier").
pub const NODE_INDEX_MULTIPLIER: u32 = 10_000;

pub struct Dispatcher {
    layout: PlanLayout,
    framework: Arc<dyn Framework>,
    worker_env: WorkerEnv,
    command_override: Option<String>,
}

impl Dispatcher {
    pub fn new(
        layout: PlanLayout,
        framework: Arc<dyn Framework>,
        worker_env: WorkerEnv,
        command_override: Option<String>,
    ) -> Self {
        Self {
            layout,
            framework,
            worker_env,
            command_override,
        }
    }

    /// Runs the plan according to `mode`, observing `cancel` for
    /// SIGINT/SIGTERM propagation into workers.
    pub async fn run(&self, mode: RunMode, cancel: CancellationToken) -> Result<(), DispatchError> {
        match mode {
            RunMode::Sequential => self.run_sequential(cancel).await,
            RunMode::ParallelLocal => self.run_parallel_local(cancel).await,
            RunMode::AssignedSlice { ci_node_index } => {
                self.run_assigned_slice(ci_node_index, 1, cancel).await
            }
        }
    }

    /// Like [`Self::run`], but for `AssignedSlice` allows sub-sharding the
    /// node's slice across `ci_node_workers` local workers.
    pub async fn run_with_sub_sharding(
        &self,
        mode: RunMode,
        ci_node_workers: u32,
        cancel: CancellationToken,
    ) -> Result<(), DispatchError> {
        match mode {
            RunMode::AssignedSlice { ci_node_index } => {
                self.run_assigned_slice(ci_node_index, ci_node_workers, cancel)
                    .await
            }
            other => self.run(other, cancel).await,
        }
    }

    async fn run_sequential(&self, cancel: CancellationToken) -> Result<(), DispatchError> {
        let files = loader::read_test_files(&self.layout).map_err(|e| {
            warn!(%e, "missing test-files.txt");
            DispatchError::MissingSlice(self.layout.test_files_txt())
        })?;

        info!(count = files.len(), "running sequentially");
        worker::run_worker(
            0,
            files,
            env_template::materialise(&self.worker_env, 0),
            self.command_override.clone(),
            self.framework.clone(),
            cancel,
        )
        .await
    }

    async fn run_parallel_local(&self, cancel: CancellationToken) -> Result<(), DispatchError> {
        let dir = self.layout.tests_split_dir();
        let entries = std::fs::read_dir(&dir)
            .map_err(|_| DispatchError::MissingSlice(dir.clone()))?;

        let mut runner_indices: Vec<u32> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| DispatchError::MissingSlice(dir.clone()))?;
            if entry.path().is_dir() {
                continue;
            }
            if let Some(index) = parse_runner_index(&entry.file_name().to_string_lossy()) {
                runner_indices.push(index);
            }
        }
        runner_indices.sort_unstable();

        info!(workers = runner_indices.len(), "running in parallel on one host");

        let mut group = TaskGroup::new();
        for index in runner_indices {
            let files = loader::read_runner_file(&self.layout, index)
                .map_err(|_| DispatchError::MissingSlice(self.layout.runner_file(index)))?;
            let env = env_template::materialise(&self.worker_env, index);
            let framework = self.framework.clone();
            let command_override = self.command_override.clone();
            let cancel = cancel.clone();
            group.spawn(async move {
                worker::run_worker(index, files, env, command_override, framework, cancel).await
            });
        }
        group.wait().await
    }

    async fn run_assigned_slice(
        &self,
        ci_node_index: u32,
        ci_node_workers: u32,
        cancel: CancellationToken,
    ) -> Result<(), DispatchError> {
        let slice_path = self.layout.runner_file(ci_node_index);
        if !slice_path.exists() {
            return Err(DispatchError::MissingSlice(slice_path));
        }
        let slice = loader::read_runner_file(&self.layout, ci_node_index)
            .map_err(|_| DispatchError::MissingSlice(slice_path.clone()))?;

        let sub_shards = round_robin_split(slice, ci_node_workers.max(1));

        info!(
            ci_node_index,
            sub_shards = sub_shards.len(),
            "running assigned slice"
        );

        let mut group = TaskGroup::new();
        for (j, files) in sub_shards.into_iter().enumerate() {
            if files.is_empty() && ci_node_workers > 1 {
                continue;
            }
            let global_index = ci_node_index * NODE_INDEX_MULTIPLIER + j as u32;
            let env = env_template::materialise(&self.worker_env, global_index);
            let framework = self.framework.clone();
            let command_override = self.command_override.clone();
            let cancel = cancel.clone();
            group.spawn(async move {
                worker::run_worker(global_index, files, env, command_override, framework, cancel)
                    .await
            });
        }
        group.wait().await
    }
}

/// Splits `files` round-robin across `m` sub-shards.
fn round_robin_split(files: Vec<PathBuf>, m: u32) -> Vec<Vec<PathBuf>> {
    let m = m.max(1) as usize;
    let mut shards: Vec<Vec<PathBuf>> = vec![Vec::new(); m];
    for (i, file) in files.into_iter().enumerate() {
        shards[i % m].push(file);
    }
    shards
}

fn parse_runner_index(file_name: &str) -> Option<u32> {
    file_name.strip_prefix("runner-")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robin_split_covers_all_files_with_m_shards() {
        let files: Vec<PathBuf> = (0..4).map(|i| PathBuf::from(format!("f{i}"))).collect();
        let shards = round_robin_split(files.clone(), 2);
        assert_eq!(shards.len(), 2);
        let union: Vec<_> = shards.iter().flatten().cloned().collect();
        let mut union_sorted = union.clone();
        union_sorted.sort();
        let mut expected_sorted = files;
        expected_sorted.sort();
        assert_eq!(union_sorted, expected_sorted);
    }

    #[test]
    fn round_robin_split_with_one_shard_keeps_everything() {
        let files = vec![PathBuf::from("a"), PathBuf::from("b")];
        let shards = round_robin_split(files.clone(), 1);
        assert_eq!(shards, vec![files]);
    }

    #[test]
    fn runner_index_parsing() {
        assert_eq!(parse_runner_index("runner-0"), Some(0));
        assert_eq!(parse_runner_index("runner-12"), Some(12));
        assert_eq!(parse_runner_index("notrunner"), None);
    }
}
