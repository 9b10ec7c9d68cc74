//! Core data model
//!
//! Plain data types shared by the planner, sizer, packer, plan writer/loader
//! and dispatcher. None of these types own I/O; they are produced and
//! consumed by the components in their respective modules.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single executable test case, as enumerated by full discovery (T2).
///
/// Identity under TIA is the canonical string `"{suite}.{name}.{parameters}"`
/// returned by [`Test::identity`]; this is the comparison key against the
/// skippable set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    pub suite: String,
    pub name: String,
    #[serde(default)]
    pub parameters: String,
    pub suite_source_file: PathBuf,
}

impl Test {
    pub fn identity(&self) -> String {
        format!("{}.{}.{}", self.suite, self.name, self.parameters)
    }
}

/// A repo-relative test file path plus the number of non-skippable tests it
/// contains. Files with weight 0 never appear here — they are dropped by
/// the planner before a `TestFile` is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFile {
    pub path: PathBuf,
    pub weight: u32,
}

/// Identity strings TIA says may be skipped for this plan. Immutable for the
/// lifetime of one `plan` invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkippableSet {
    ids: std::collections::HashSet<String>,
}

impl SkippableSet {
    pub fn new(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, test: &Test) -> bool {
        self.ids.contains(&test.identity())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Settings fetched from TIA describing whether test-impact analysis is
/// authorised at all. Named `TiaSettings` (rather than `Settings`, as in
/// spec.md) to avoid colliding with this crate's own CLI-derived run
/// settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TiaSettings {
    pub itr_enabled: bool,
    pub tests_skipping: bool,
}

impl TiaSettings {
    /// True when both ITR and test-level skipping are authorised — the only
    /// condition under which the planner keeps T2 running and trusts its
    /// skippable-set lookups.
    pub fn skipping_authorised(&self) -> bool {
        self.itr_enabled && self.tests_skipping
    }
}

/// The durable artifact persisted under the Plan Directory by `plan` and
/// consumed by `run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// All surviving test files, sorted lexicographically by path.
    pub test_files: Vec<PathBuf>,
    /// `100 * |skipped| / |discovered|`, or 0 when full discovery fell back.
    pub skippable_percentage: f64,
    /// Number of worker shards, equal to `per_worker.len()`.
    pub worker_count: u32,
    /// Index `k` holds the paths assigned to worker `k`.
    pub per_worker: Vec<Vec<PathBuf>>,
}

impl Plan {
    /// Builds a plan from packed bins, recording the worker count as the
    /// number of bins (invariant 2 in spec.md §3).
    pub fn new(
        test_files: Vec<PathBuf>,
        skippable_percentage: f64,
        per_worker: Vec<Vec<PathBuf>>,
    ) -> Self {
        let worker_count = per_worker.len() as u32;
        Self {
            test_files,
            skippable_percentage,
            worker_count,
            per_worker,
        }
    }
}

/// Bookkeeping persisted alongside the plan for human debugging. Never read
/// by `run`'s control flow — it cannot affect the bit-exact file contracts
/// the CI provider and framework adapters depend on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub tool_version: String,
}

impl PlanMetadata {
    pub fn now() -> Self {
        Self {
            generated_at: chrono::Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// An ordered list of `(key, value_template)` pairs. Each `value_template`
/// may contain the literal placeholder `{{nodeIndex}}`, substituted at
/// spawn time by [`crate::dispatch::env_template::materialise`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerEnv(pub Vec<(String, String)>);

impl WorkerEnv {
    /// Parses the `--worker-env` CLI value: `K=V` pairs separated by `;`.
    pub fn parse(raw: &str) -> Result<Self, crate::error::ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut pairs = Vec::new();
        for entry in raw.split(';') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (key, value) = entry.split_once('=').ok_or_else(|| {
                crate::error::ConfigError::MalformedWorkerEnv(entry.to_string())
            })?;
            pairs.push((key.trim().to_string(), value.trim().to_string()));
        }
        Ok(Self(pairs))
    }
}

/// The three ways the dispatcher can execute a plan, derived from the plan's
/// worker count and the `--ci-node` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Sequential,
    ParallelLocal,
    AssignedSlice { ci_node_index: u32 },
}

impl RunMode {
    pub fn from(worker_count: u32, ci_node_index: i64) -> Self {
        if ci_node_index >= 0 {
            RunMode::AssignedSlice {
                ci_node_index: ci_node_index as u32,
            }
        } else if worker_count > 1 {
            RunMode::ParallelLocal
        } else {
            RunMode::Sequential
        }
    }
}

/// Lifecycle of one dispatcher-spawned worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Pending,
    Starting,
    Running,
    Success,
    Failed,
    Cancelled,
}

impl WorkerState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WorkerState::Success | WorkerState::Failed | WorkerState::Cancelled
        )
    }
}

/// Maps a test file's repo-relative path to the count of non-skippable
/// tests it contains. The type bin-packing and plan-writing operate on.
pub type WeightedFiles = BTreeMap<PathBuf, u32>;
