//! End-to-end `plan` -> Plan Directory -> `run`-side read-back coverage.

use std::collections::BTreeMap;
use std::sync::Arc;

use tempfile::tempdir;
use testoptimizer::adapters::ci;
use testoptimizer::adapters::framework::FilesystemFramework;
use testoptimizer::adapters::platform::GenericPlatform;
use testoptimizer::adapters::tia::InMemoryTiaClient;
use testoptimizer::plan::layout::PlanLayout;
use testoptimizer::plan::loader::{self, LoadOutcome};
use testoptimizer::plan::writer::write_plan;
use testoptimizer::planner::{Planner, PlannerInputs};

fn inputs(repo_root: std::path::PathBuf) -> PlannerInputs {
    PlannerInputs {
        repo_root,
        tests_location: None,
        runtime_tags_override: BTreeMap::new(),
        min_parallelism: 1,
        max_parallelism: 4,
    }
}

/// S1: a small repository with no TIA backend plans to a single worker
/// holding every discovered file, and the written artifacts round-trip
/// through the loader byte-for-byte.
#[tokio::test]
async fn s1_scenario_plans_and_round_trips_through_loader() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a_test.rs"), "").unwrap();
    std::fs::write(dir.path().join("b_test.rs"), "").unwrap();
    std::fs::write(dir.path().join("c_test.rs"), "").unwrap();

    let planner = Planner::new(
        Arc::new(GenericPlatform),
        Arc::new(FilesystemFramework::new()),
        Box::new(InMemoryTiaClient::disabled()),
    );
    let layout = PlanLayout::new(dir.path().join(".testoptimization"));
    let plan = planner
        .plan(&inputs(dir.path().to_path_buf()), &layout)
        .await
        .unwrap();

    write_plan(&layout, &plan).unwrap();

    let worker_count = match loader::check(&layout).unwrap() {
        LoadOutcome::WorkerCount(n) => n,
        LoadOutcome::NeedsReplan => panic!("expected a freshly written plan"),
    };
    assert_eq!(worker_count, plan.worker_count);

    let mut union = Vec::new();
    for i in 0..worker_count {
        union.extend(loader::read_runner_file(&layout, i).unwrap());
    }
    union.sort();

    let mut expected = loader::read_test_files(&layout).unwrap();
    expected.sort();
    assert_eq!(union, expected);
    assert_eq!(expected.len(), 3);
}

/// Invariant 7: a plan written to disk, then configured for GitHub Actions,
/// produces a CI matrix whose entry count matches `worker_count`.
#[tokio::test]
async fn written_plan_and_ci_matrix_agree_on_worker_count() {
    let dir = tempdir().unwrap();
    for name in ["a_test.rs", "b_test.rs", "c_test.rs", "d_test.rs"] {
        std::fs::write(dir.path().join(name), "").unwrap();
    }

    let planner = Planner::new(
        Arc::new(GenericPlatform),
        Arc::new(FilesystemFramework::new()),
        Box::new(InMemoryTiaClient::disabled()),
    );
    let layout = PlanLayout::new(dir.path().join(".testoptimization"));
    let plan = planner
        .plan(&inputs(dir.path().to_path_buf()), &layout)
        .await
        .unwrap();
    write_plan(&layout, &plan).unwrap();

    let provider = ci::resolve("github").unwrap();
    provider.configure(layout.root(), plan.worker_count).unwrap();

    let content = std::fs::read_to_string(layout.root().join("github/config")).unwrap();
    let occurrences = content.matches("ci_node_index").count();
    assert_eq!(occurrences as u32, plan.worker_count);
}

/// A plan computed with skipping authorised and a non-empty skippable set
/// persists its TIA cache alongside the plan artifacts.
#[tokio::test]
async fn plan_with_skipping_persists_cache_and_lower_percentage_bounds() {
    use testoptimizer::model::TiaSettings;

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a_test.rs"), "").unwrap();
    std::fs::write(dir.path().join("b_test.rs"), "").unwrap();

    let planner = Planner::new(
        Arc::new(GenericPlatform),
        Arc::new(FilesystemFramework::new()),
        Box::new(InMemoryTiaClient::new(
            TiaSettings {
                itr_enabled: true,
                tests_skipping: true,
            },
            vec!["a_test.default.".to_string()],
        )),
    );
    let layout = PlanLayout::new(dir.path().join(".testoptimization"));
    let plan = planner
        .plan(&inputs(dir.path().to_path_buf()), &layout)
        .await
        .unwrap();

    assert_eq!(plan.skippable_percentage, 50.0);
    assert!(layout.skippable_tests_json().exists());

    write_plan(&layout, &plan).unwrap();
    assert!(layout.parallel_runners_txt().exists());
}
