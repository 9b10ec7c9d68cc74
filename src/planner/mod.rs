//! Planner (C7)
//!
//! Orchestrates three logical tasks concurrently within one `plan`
//! invocation (spec.md §4.3):
//!
//! - **T1 — TIA session.** Init the TIA client, fetch settings, cancel T2 if
//!   skipping is unauthorised, fetch the skippable set, persist the cache.
//!   Cache persistence happens exactly once per `plan` regardless of
//!   whether client initialisation itself succeeded (spec.md §5).
//! - **T2 — full discovery.** Enumerate individual tests, normalising each
//!   test's source file against the CWD-relative prefix (spec.md §9), and
//!   persisting the resulting stream to `tests-discovery/tests.json`
//!   (spec.md §6). Cancellable, never fatal.
//! - **T3 — fast discovery.** Enumerate test file paths only. Always runs,
//!   fatal on failure.
//!
//! After all three complete, the planner picks a strategy: if T2 produced
//! at least one test, weight files by non-skippable test count; otherwise
//! fall back to fast-discovery output with every file weighted 1.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::adapters::framework::Framework;
use crate::adapters::platform::Platform;
use crate::adapters::tia::TiaClient;
use crate::cancel::CancellationToken;
use crate::error::{DiscoveryError, EnvironmentError, TiaFatalError};
use crate::model::{Plan, SkippableSet, Test, WeightedFiles};
use crate::packer;
use crate::pathnorm;
use crate::plan::{cache, discovery, layout::PlanLayout};
use crate::sizer;

/// Everything the planner needs that isn't itself plan state: the adapters
/// it drives and the bounds it sizes against.
pub struct PlannerInputs {
    pub repo_root: PathBuf,
    pub tests_location: Option<String>,
    pub runtime_tags_override: BTreeMap<String, String>,
    pub min_parallelism: i64,
    pub max_parallelism: i64,
}

/// Planner failure modes. T2 failures never reach this type — they are
/// logged and swallowed inside the planner (spec.md §4.3).
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
    #[error(transparent)]
    TiaFatal(#[from] TiaFatalError),
    #[error(transparent)]
    FastDiscovery(#[from] DiscoveryError),
}

pub struct Planner {
    platform: Arc<dyn Platform>,
    framework: Arc<dyn Framework>,
    tia_client: tokio::sync::Mutex<Box<dyn TiaClient>>,
}

impl Planner {
    pub fn new(
        platform: Arc<dyn Platform>,
        framework: Arc<dyn Framework>,
        tia_client: Box<dyn TiaClient>,
    ) -> Self {
        Self {
            platform,
            framework,
            tia_client: tokio::sync::Mutex::new(tia_client),
        }
    }

    /// Runs T1/T2/T3 concurrently and produces a [`Plan`]. The plan's
    /// worker count is computed from the resulting skippability percentage
    /// via [`sizer::compute_workers`], and its per-worker shards via
    /// [`packer::pack`].
    pub async fn plan(
        &self,
        inputs: &PlannerInputs,
        layout: &PlanLayout,
    ) -> Result<Plan, PlannerError> {
        self.platform.sanity_check(&inputs.repo_root)?;

        let cwd = std::env::current_dir().unwrap_or_else(|_| inputs.repo_root.clone());
        let prefix = pathnorm::cwd_prefix_within(&inputs.repo_root, &cwd);

        let t2_cancel = CancellationToken::new();

        let t1 = self.run_t1(inputs, layout, t2_cancel.clone());
        let t2 = self.run_t2(inputs, t2_cancel, prefix.as_deref(), layout);
        let t3 = self.run_t3(inputs);

        let (t1_result, t2_tests, t3_result) = tokio::join!(t1, t2, t3);

        let skippable = t1_result?;
        let test_files = t3_result?;

        let (weighted, skippable_percentage) = if !t2_tests.is_empty() {
            let discovered = t2_tests.len();
            let skipped = t2_tests.iter().filter(|t| skippable.contains(t)).count();
            info!(discovered, skipped, "using full discovery results");
            let pct = 100.0 * skipped as f64 / discovered as f64;
            (weight_by_skippable(t2_tests, &skippable), pct)
        } else {
            info!("falling back to fast discovery; treating every file as weight 1");
            let weighted: WeightedFiles = test_files.into_iter().map(|f| (f, 1u32)).collect();
            (weighted, 0.0)
        };

        let worker_count = sizer::compute_workers(
            skippable_percentage,
            inputs.min_parallelism,
            inputs.max_parallelism,
        );
        let bins = packer::pack(&weighted, worker_count);

        let mut test_files: Vec<PathBuf> = weighted.keys().cloned().collect();
        test_files.sort();

        Ok(Plan::new(test_files, skippable_percentage, bins))
    }

    /// T3: fast file-level discovery. Its failure is fatal to the planner
    /// (propagated via `?` at the call site in [`Self::plan`]). spec.md §9's
    /// path normalisation applies only to full discovery's output, not this
    /// task's.
    async fn run_t3(&self, inputs: &PlannerInputs) -> Result<Vec<PathBuf>, DiscoveryError> {
        self.framework
            .discover_test_files(&inputs.repo_root, inputs.tests_location.as_deref())
            .await
    }

    /// T2: full test-level discovery, cancellable by T1. Never fatal — a
    /// failure or empty cancellation outcome just means the planner falls
    /// back to fast-discovery output. Normalises `suite_source_file` against
    /// `prefix` (spec.md §9) and persists the resulting stream to
    /// `tests-discovery/tests.json` regardless of outcome — an empty stream
    /// represents "full discovery produced nothing" (spec.md §6).
    async fn run_t2(
        &self,
        inputs: &PlannerInputs,
        cancel: CancellationToken,
        prefix: Option<&Path>,
        layout: &PlanLayout,
    ) -> Vec<Test> {
        let tests = match self
            .framework
            .discover_tests(&inputs.repo_root, inputs.tests_location.as_deref(), &cancel)
            .await
        {
            Ok(tests) => normalise_suite_source_files(tests, prefix),
            Err(e) => {
                warn!(%e, "full discovery failed; degrading to fast discovery");
                Vec::new()
            }
        };

        if let Err(e) = discovery::persist(layout, &tests) {
            warn!(%e, "failed to persist discovery stream");
        }

        tests
    }

    /// T1: TIA session. Cancels T2 the moment it learns skipping is
    /// unauthorised (only after the settings call has resolved — spec.md
    /// §5's ordering guarantee), and persists whatever the client has
    /// accumulated to the cache even if client initialisation itself fails.
    async fn run_t1(
        &self,
        inputs: &PlannerInputs,
        layout: &PlanLayout,
        t2_cancel: CancellationToken,
    ) -> Result<SkippableSet, TiaFatalError> {
        let mut tags = self.platform.build_tags(&inputs.repo_root);
        for (k, v) in &inputs.runtime_tags_override {
            tags.insert(k.clone(), v.clone());
        }

        let mut client = self.tia_client.lock().await;

        if let Err(e) = client.init(tags).await {
            let snapshot = client.snapshot();
            drop(client);
            if let Err(persist_err) = cache::persist(layout, &snapshot) {
                warn!(%persist_err, "failed to persist TIA cache after init failure");
            }
            return Err(e);
        }

        let settings = match client.fetch_settings().await {
            Ok(s) => s,
            Err(e) => {
                warn!(%e, "TIA settings fetch failed; treating skipping as unauthorised");
                Default::default()
            }
        };

        if !settings.skipping_authorised() {
            t2_cancel.cancel();
        }

        let skippable = if settings.skipping_authorised() {
            match client.fetch_skippable().await {
                Ok(set) => set,
                Err(e) => {
                    warn!(%e, "TIA skippable-set fetch failed; treating skippable set as empty");
                    SkippableSet::default()
                }
            }
        } else {
            SkippableSet::default()
        };

        let snapshot = client.snapshot();
        drop(client);

        if let Err(e) = cache::persist(layout, &snapshot) {
            warn!(%e, "failed to persist TIA cache");
        }

        Ok(skippable)
    }
}

/// Strips `prefix` from each test's `suite_source_file` (spec.md §9); a pure
/// helper kept separate from [`Planner::run_t2`] so it can be exercised
/// without going through real discovery.
fn normalise_suite_source_files(tests: Vec<Test>, prefix: Option<&Path>) -> Vec<Test> {
    tests
        .into_iter()
        .map(|mut t| {
            t.suite_source_file = pathnorm::strip_cwd_prefix(&t.suite_source_file, prefix);
            t
        })
        .collect()
}

/// Builds the weighted-file map: each discovered test's source file gains
/// one point of weight unless the test is in `skippable`; files left at
/// weight 0 are dropped (spec.md §3, TestFile invariant).
fn weight_by_skippable(tests: Vec<Test>, skippable: &SkippableSet) -> WeightedFiles {
    let mut weights: WeightedFiles = WeightedFiles::new();
    for test in &tests {
        if skippable.contains(test) {
            continue;
        }
        *weights.entry(test.suite_source_file.clone()).or_insert(0) += 1;
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::framework::FilesystemFramework;
    use crate::adapters::platform::GenericPlatform;
    use crate::adapters::tia::{InMemoryTiaClient, TiaCache};
    use crate::error::TiaTransientError;
    use crate::model::TiaSettings;
    use async_trait::async_trait;
    use tempfile::tempdir;

    fn inputs(repo_root: PathBuf) -> PlannerInputs {
        PlannerInputs {
            repo_root,
            tests_location: None,
            runtime_tags_override: BTreeMap::new(),
            min_parallelism: 1,
            max_parallelism: 1,
        }
    }

    #[tokio::test]
    async fn falls_back_to_fast_discovery_when_tia_disabled() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a_test.rs"), "").unwrap();
        std::fs::write(dir.path().join("b_test.rs"), "").unwrap();

        let planner = Planner::new(
            Arc::new(GenericPlatform),
            Arc::new(FilesystemFramework::new()),
            Box::new(InMemoryTiaClient::disabled()),
        );
        let layout = PlanLayout::new(dir.path().join(".testoptimization"));
        let plan = planner.plan(&inputs(dir.path().to_path_buf()), &layout).await.unwrap();

        assert_eq!(plan.skippable_percentage, 0.0);
        assert_eq!(plan.test_files.len(), 2);
    }

    #[tokio::test]
    async fn weights_files_by_non_skippable_test_count() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a_test.rs"), "").unwrap();
        std::fs::write(dir.path().join("b_test.rs"), "").unwrap();

        // The reference framework adapter emits one test per file named
        // "<stem>.default."; skip one of the two.
        let skip_id = format!("a_test.default.");
        let planner = Planner::new(
            Arc::new(GenericPlatform),
            Arc::new(FilesystemFramework::new()),
            Box::new(InMemoryTiaClient::new(
                TiaSettings {
                    itr_enabled: true,
                    tests_skipping: true,
                },
                vec![skip_id],
            )),
        );
        let layout = PlanLayout::new(dir.path().join(".testoptimization"));
        let plan = planner
            .plan(&inputs(dir.path().to_path_buf()), &layout)
            .await
            .unwrap();

        assert_eq!(plan.skippable_percentage, 50.0);
        assert_eq!(plan.test_files.len(), 1);
    }

    #[tokio::test]
    async fn persists_cache_even_when_skipping_unauthorised() {
        let dir = tempdir().unwrap();
        let planner = Planner::new(
            Arc::new(GenericPlatform),
            Arc::new(FilesystemFramework::new()),
            Box::new(InMemoryTiaClient::disabled()),
        );
        let layout = PlanLayout::new(dir.path().join(".testoptimization"));
        planner.plan(&inputs(dir.path().to_path_buf()), &layout).await.unwrap();

        assert!(layout.settings_json().exists());
    }

    #[tokio::test]
    async fn persists_discovery_stream_alongside_the_plan() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a_test.rs"), "").unwrap();

        let planner = Planner::new(
            Arc::new(GenericPlatform),
            Arc::new(FilesystemFramework::new()),
            Box::new(InMemoryTiaClient::disabled()),
        );
        let layout = PlanLayout::new(dir.path().join(".testoptimization"));
        planner.plan(&inputs(dir.path().to_path_buf()), &layout).await.unwrap();

        assert!(layout.discovery_tests_json().exists());
        let content = std::fs::read_to_string(layout.discovery_tests_json()).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn normalise_suite_source_files_strips_prefix() {
        let tests = vec![Test {
            suite: "Suite".to_string(),
            name: "a".to_string(),
            parameters: String::new(),
            suite_source_file: PathBuf::from("services/api/a_test.rs"),
        }];

        let normalised = normalise_suite_source_files(tests, Some(Path::new("services/api")));

        assert_eq!(
            normalised[0].suite_source_file,
            PathBuf::from("a_test.rs")
        );
    }

    /// A TIA client whose `init` always fails, used to exercise the
    /// cache-persist-on-init-failure path without a real network client.
    struct FailingInitTiaClient;

    #[async_trait]
    impl TiaClient for FailingInitTiaClient {
        async fn init(&mut self, _tags: BTreeMap<String, String>) -> Result<(), TiaFatalError> {
            Err(TiaFatalError("connection refused".to_string()))
        }

        async fn fetch_settings(&mut self) -> Result<TiaSettings, TiaTransientError> {
            unreachable!("init fails before settings are ever fetched")
        }

        async fn fetch_skippable(&mut self) -> Result<SkippableSet, TiaTransientError> {
            unreachable!("init fails before the skippable set is ever fetched")
        }

        fn snapshot(&self) -> TiaCache {
            TiaCache::default()
        }
    }

    #[tokio::test]
    async fn persists_cache_even_when_client_init_fails() {
        let dir = tempdir().unwrap();
        let planner = Planner::new(
            Arc::new(GenericPlatform),
            Arc::new(FilesystemFramework::new()),
            Box::new(FailingInitTiaClient),
        );
        let layout = PlanLayout::new(dir.path().join(".testoptimization"));

        let err = planner
            .plan(&inputs(dir.path().to_path_buf()), &layout)
            .await
            .unwrap_err();

        assert!(matches!(err, PlannerError::TiaFatal(_)));
        assert!(layout.settings_json().exists());
    }
}
