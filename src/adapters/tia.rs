//! TIA client contract (C2)
//!
//! The real TIA backend (HTTP transport, authentication, on-disk caching)
//! is out of scope per spec.md §1 — only the contract the planner's T1 task
//! needs is specified here, plus an in-memory reference implementation that
//! honours [`crate::state::ProcessState`]'s test-mode flag (spec.md §4.8,
//! "may cause the TIA client to run in an in-memory mode").

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::{TiaFatalError, TiaTransientError};
use crate::model::{SkippableSet, TiaSettings};

/// Everything T1 persists to the Plan Directory's `cache/` subtree
/// (spec.md §4.3, §6). Fields beyond `settings`/`skippable` are opaque
/// blobs this crate's core never reads back — only `run`'s adapters would,
/// in a production deployment.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TiaCache {
    pub settings: TiaSettings,
    pub skippable_tests: Vec<String>,
    pub known_tests: serde_json::Value,
    pub test_management_tests: serde_json::Value,
}

/// Capability set a TIA client must provide.
#[async_trait]
pub trait TiaClient: Send + Sync {
    /// Initialises the client session with the given tag map. Failure here
    /// is fatal for the planner ([`TiaFatalError`]).
    async fn init(&mut self, tags: BTreeMap<String, String>) -> Result<(), TiaFatalError>;

    /// Fetches whether ITR / test-level skipping are authorised for this
    /// tag set.
    async fn fetch_settings(&mut self) -> Result<TiaSettings, TiaTransientError>;

    /// Fetches the set of test identities TIA says may be skipped.
    async fn fetch_skippable(&mut self) -> Result<SkippableSet, TiaTransientError>;

    /// Returns everything fetched so far, for cache persistence. Must
    /// return a usable (possibly partial) snapshot even if earlier fetches
    /// failed, since persistence must happen exactly once per `plan`
    /// regardless of T1's success (spec.md §5).
    fn snapshot(&self) -> TiaCache;
}

/// In-memory fixture client: no network, fixed responses, used both by this
/// crate's tests and by a CLI run with `--test-mode`.
pub struct InMemoryTiaClient {
    fixed_settings: TiaSettings,
    fixed_skippable: Vec<String>,
    tags: BTreeMap<String, String>,
}

impl InMemoryTiaClient {
    pub fn new(fixed_settings: TiaSettings, fixed_skippable: Vec<String>) -> Self {
        Self {
            fixed_settings,
            fixed_skippable,
            tags: BTreeMap::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(TiaSettings::default(), Vec::new())
    }
}

#[async_trait]
impl TiaClient for InMemoryTiaClient {
    async fn init(&mut self, tags: BTreeMap<String, String>) -> Result<(), TiaFatalError> {
        self.tags = tags;
        Ok(())
    }

    async fn fetch_settings(&mut self) -> Result<TiaSettings, TiaTransientError> {
        Ok(self.fixed_settings)
    }

    async fn fetch_skippable(&mut self) -> Result<SkippableSet, TiaTransientError> {
        Ok(SkippableSet::new(self.fixed_skippable.iter().cloned()))
    }

    fn snapshot(&self) -> TiaCache {
        TiaCache {
            settings: self.fixed_settings,
            skippable_tests: self.fixed_skippable.clone(),
            known_tests: serde_json::Value::Array(Vec::new()),
            test_management_tests: serde_json::Value::Array(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_client_reports_no_skipping_authorised() {
        let mut client = InMemoryTiaClient::disabled();
        client.init(BTreeMap::new()).await.unwrap();
        let settings = client.fetch_settings().await.unwrap();
        assert!(!settings.skipping_authorised());
    }

    #[tokio::test]
    async fn enabled_client_returns_fixed_skippable_set() {
        let mut client = InMemoryTiaClient::new(
            TiaSettings {
                itr_enabled: true,
                tests_skipping: true,
            },
            vec!["Suite.test_a.".to_string()],
        );
        client.init(BTreeMap::new()).await.unwrap();
        let skippable = client.fetch_skippable().await.unwrap();
        assert_eq!(skippable.len(), 1);
    }

    #[test]
    fn snapshot_is_available_without_any_fetch() {
        let client = InMemoryTiaClient::disabled();
        let snapshot = client.snapshot();
        assert!(snapshot.skippable_tests.is_empty());
    }
}
