//! Plan Directory layout (on-disk contract, spec.md §6)
//!
//! ```text
//! <PlanDir>/                    default name ".testoptimization"
//!   cache/
//!     settings.json
//!     known_tests.json
//!     skippable_tests.json
//!     test_management_tests.json
//!   tests-discovery/
//!     tests.json
//!   test-files.txt
//!   parallel-runners.txt
//!   skippable-percentage.txt
//!   tests-split/
//!     runner-0 .. runner-(N-1)
//!   github/config                (optional)
//! ```

use std::path::{Path, PathBuf};

pub const DEFAULT_PLAN_DIR_NAME: &str = ".testoptimization";

#[derive(Debug, Clone)]
pub struct PlanLayout {
    root: PathBuf,
}

impl PlanLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn default_under(repo_root: &Path) -> Self {
        Self::new(repo_root.join(DEFAULT_PLAN_DIR_NAME))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    pub fn settings_json(&self) -> PathBuf {
        self.cache_dir().join("settings.json")
    }

    pub fn known_tests_json(&self) -> PathBuf {
        self.cache_dir().join("known_tests.json")
    }

    pub fn skippable_tests_json(&self) -> PathBuf {
        self.cache_dir().join("skippable_tests.json")
    }

    pub fn test_management_tests_json(&self) -> PathBuf {
        self.cache_dir().join("test_management_tests.json")
    }

    pub fn discovery_dir(&self) -> PathBuf {
        self.root.join("tests-discovery")
    }

    pub fn discovery_tests_json(&self) -> PathBuf {
        self.discovery_dir().join("tests.json")
    }

    pub fn test_files_txt(&self) -> PathBuf {
        self.root.join("test-files.txt")
    }

    pub fn parallel_runners_txt(&self) -> PathBuf {
        self.root.join("parallel-runners.txt")
    }

    pub fn skippable_percentage_txt(&self) -> PathBuf {
        self.root.join("skippable-percentage.txt")
    }

    pub fn tests_split_dir(&self) -> PathBuf {
        self.root.join("tests-split")
    }

    pub fn runner_file(&self, index: u32) -> PathBuf {
        self.tests_split_dir().join(format!("runner-{index}"))
    }

    pub fn metadata_json(&self) -> PathBuf {
        self.root.join("metadata.json")
    }
}
