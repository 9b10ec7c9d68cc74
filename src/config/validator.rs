//! CLI-to-core translation and validation
//!
//! Resolves adapter names, parses the JSON/`K=V` scalars clap leaves as
//! strings, and assembles the typed inputs the planner and dispatcher
//! actually take. Nothing here does I/O beyond what adapter resolution
//! itself requires.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::adapters::tia::InMemoryTiaClient;
use crate::adapters::{ci, framework, platform};
use crate::adapters::{Framework, TiaClient};
use crate::error::ConfigError;
use crate::model::WorkerEnv;
use crate::plan::layout::PlanLayout;
use crate::planner::{Planner, PlannerInputs};

use super::cli::{GlobalArgs, PlannerArgs, RunArgs};

/// Resolves `plan_dir` against `repo_root`, defaulting to
/// `<repo-root>/.testoptimization` when unset.
pub fn resolve_layout(global: &GlobalArgs) -> PlanLayout {
    match &global.plan_dir {
        Some(dir) => PlanLayout::new(dir.clone()),
        None => PlanLayout::default_under(&global.repo_root),
    }
}

/// Parses `--runtime-tags` as a flat JSON object of string values; an absent
/// flag yields an empty map (spec.md §6 default `{}`).
pub fn parse_runtime_tags(raw: Option<&str>) -> Result<BTreeMap<String, String>, ConfigError> {
    match raw {
        None => Ok(BTreeMap::new()),
        Some(raw) => serde_json::from_str(raw).map_err(ConfigError::MalformedRuntimeTags),
    }
}

pub fn resolve_platform(name: &str) -> Result<Arc<dyn platform::Platform>, ConfigError> {
    platform::resolve(name).map(Arc::from)
}

pub fn resolve_framework(name: &str) -> Result<Arc<dyn framework::Framework>, ConfigError> {
    framework::resolve(name).map(Arc::from)
}

pub fn resolve_ci_provider(name: &str) -> Result<Box<dyn ci::CiProvider>, ConfigError> {
    ci::resolve(name)
}

/// Builds the planner's inputs from a validated invocation's shared
/// [`PlannerArgs`] — used both by `plan` and by `run`'s implicit replan.
pub fn planner_inputs(
    global: &GlobalArgs,
    args: &PlannerArgs,
) -> Result<PlannerInputs, ConfigError> {
    Ok(PlannerInputs {
        repo_root: global.repo_root.clone(),
        tests_location: args.tests_location.clone(),
        runtime_tags_override: parse_runtime_tags(args.runtime_tags.as_deref())?,
        min_parallelism: args.min_parallelism,
        max_parallelism: args.max_parallelism,
    })
}

/// Resolves adapters and assembles a [`Planner`] plus its [`PlannerInputs`]
/// from shared `PlannerArgs`, returning the framework adapter alongside so
/// `run` can hand the same instance to its `Dispatcher` without resolving
/// it twice. No real TIA backend ships with this crate (spec.md §1);
/// `--test-mode` and unconfigured runs both get the in-memory fixture
/// client.
pub fn build_planner(
    global: &GlobalArgs,
    args: &PlannerArgs,
) -> Result<(Planner, PlannerInputs, Arc<dyn Framework>), ConfigError> {
    let platform = resolve_platform(&args.platform)?;
    let framework = resolve_framework(&args.framework)?;
    let inputs = planner_inputs(global, args)?;

    let tia_client: Box<dyn TiaClient> = Box::new(InMemoryTiaClient::disabled());
    let planner = Planner::new(platform, framework.clone(), tia_client);

    Ok((planner, inputs, framework))
}

pub fn worker_env(args: &RunArgs) -> Result<WorkerEnv, ConfigError> {
    WorkerEnv::parse(args.worker_env.as_deref().unwrap_or(""))
}

/// Strips a literal `--` from `--command`'s value, warning when present
/// (spec.md §6: "`--` in value is stripped with a warning").
pub fn command_override(raw: Option<&str>) -> Option<String> {
    raw.map(|value| {
        if value.contains("--") {
            warn!(%value, "stripping literal `--` from --command");
            value.replace("--", "")
        } else {
            value.to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_runtime_tags_default_to_empty_map() {
        assert!(parse_runtime_tags(None).unwrap().is_empty());
    }

    #[test]
    fn parses_flat_json_object() {
        let tags = parse_runtime_tags(Some(r#"{"team":"platform"}"#)).unwrap();
        assert_eq!(tags.get("team").map(String::as_str), Some("platform"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_runtime_tags(Some("not json")).is_err());
    }

    #[test]
    fn rejects_unknown_adapter_names() {
        assert!(resolve_platform("nonexistent").is_err());
        assert!(resolve_framework("nonexistent").is_err());
        assert!(resolve_ci_provider("nonexistent").is_err());
    }

    #[test]
    fn command_override_passes_through_plain_values() {
        assert_eq!(
            command_override(Some("./run-tests.sh")),
            Some("./run-tests.sh".to_string())
        );
    }

    #[test]
    fn command_override_strips_literal_double_dash() {
        assert_eq!(
            command_override(Some("./run-tests.sh -- --verbose")),
            Some("./run-tests.sh  verbose".to_string())
        );
    }

    #[test]
    fn command_override_of_none_is_none() {
        assert_eq!(command_override(None), None);
    }
}
