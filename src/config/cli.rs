//! CLI argument parsing using clap
//!
//! Two subcommands mirror the two entry points spec.md §6 names: `plan`
//! (drives the Planner, C4–C7) and `run` (drives the Dispatcher, C8–C9).
//! Every flag has a matching `DD_CIVISIBILITY_*` environment variable via
//! clap's `env` feature, grounded in the original tooling this spec distills
//! (`original_source`'s `DD_`-prefixed naming family).
//!
//! `PlannerArgs` is shared (via `#[command(flatten)]`) between `plan` and
//! `run`: `run` needs the same adapter/bounds inputs to trigger an implicit
//! replan when the Plan Directory is missing (spec.md §4.7).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

fn default_parallelism() -> i64 {
    num_cpus::get() as i64
}

fn default_ci_node_workers() -> u32 {
    num_cpus::get() as u32
}

/// testoptimizer - test-workload planner and dispatcher for CI pipelines
#[derive(Parser, Debug)]
#[command(name = "testoptimizer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Parser, Debug)]
pub struct GlobalArgs {
    /// Repository root to operate on.
    #[arg(long, default_value = ".")]
    pub repo_root: PathBuf,

    /// Plan Directory path; defaults to `<repo-root>/.testoptimization`.
    #[arg(long, env = "DD_CIVISIBILITY_PLAN_DIR")]
    pub plan_dir: Option<PathBuf>,

    /// Run the TIA client in its in-memory fixture mode, bypassing any real
    /// backend (spec.md §4.8, C10's test-mode flag).
    #[arg(long, env = "DD_CIVISIBILITY_TEST_MODE")]
    pub test_mode: bool,

    /// Tracing filter directive, e.g. "info" or "testoptimizer=debug".
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute a plan and write it to the Plan Directory.
    Plan(PlanArgs),
    /// Execute a previously computed plan, replanning first if missing.
    Run(RunArgs),
}

/// Inputs the Planner needs: adapter selection plus sizing/tagging bounds.
/// Flattened into both [`PlanArgs`] (explicit `plan` invocations) and
/// [`RunArgs`] (implicit replan on a missing Plan Directory).
#[derive(Parser, Debug)]
pub struct PlannerArgs {
    /// Platform adapter name (e.g. "generic").
    #[arg(long, env = "DD_CIVISIBILITY_PLATFORM")]
    pub platform: String,

    /// Framework adapter name (e.g. "filesystem").
    #[arg(long, env = "DD_CIVISIBILITY_FRAMEWORK")]
    pub framework: String,

    /// Lower bound on worker count.
    #[arg(long, env = "DD_CIVISIBILITY_MIN_PARALLELISM", default_value_t = default_parallelism())]
    pub min_parallelism: i64,

    /// Upper bound on worker count.
    #[arg(long, env = "DD_CIVISIBILITY_MAX_PARALLELISM", default_value_t = default_parallelism())]
    pub max_parallelism: i64,

    /// Override path under which tests are discovered, relative to the repo
    /// root; omit to let the framework adapter pick its own default.
    #[arg(long, env = "DD_CIVISIBILITY_TESTS_LOCATION")]
    pub tests_location: Option<String>,

    /// JSON object of extra tags merged into the TIA tag map.
    #[arg(long, env = "DD_CIVISIBILITY_RUNTIME_TAGS")]
    pub runtime_tags: Option<String>,

    /// CI-provider adapter name (e.g. "github").
    #[arg(long, env = "DD_CIVISIBILITY_CI_PROVIDER", default_value = "github")]
    pub ci_provider: String,
}

#[derive(Parser, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub planner: PlannerArgs,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub planner: PlannerArgs,

    /// This process's CI node index, or -1 if not running under a CI matrix.
    #[arg(long, env = "DD_CIVISIBILITY_CI_NODE", default_value_t = -1)]
    pub ci_node: i64,

    /// Local sub-workers to split this node's slice across.
    #[arg(long, env = "DD_CIVISIBILITY_CI_NODE_WORKERS", default_value_t = default_ci_node_workers())]
    pub ci_node_workers: u32,

    /// `K=V;K=V` environment template applied to each worker, `{{nodeIndex}}`
    /// substituted per worker.
    #[arg(long, env = "DD_CIVISIBILITY_WORKER_ENV")]
    pub worker_env: Option<String>,

    /// Overrides the framework adapter's default run command. A literal
    /// `--` in the value is stripped with a warning (spec.md §6).
    #[arg(long, env = "DD_CIVISIBILITY_COMMAND")]
    pub command: Option<String>,
}
