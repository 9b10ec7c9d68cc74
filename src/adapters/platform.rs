//! Platform adapter contract (C1, platform half)
//!
//! A platform adapter knows about the surrounding ecosystem (language,
//! package manager, VCS) well enough to build the tag map TIA needs and to
//! sanity-check the repository before planning begins. It does not know how
//! to run tests — that is the [`super::framework::Framework`] adapter's job.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::EnvironmentError;

/// Capability set a platform adapter must provide.
///
/// # Lifecycle
///
/// `sanity_check` runs once at startup and is fatal on failure
/// ([`EnvironmentError`]); `build_tags` is called by the planner's TIA
/// session (T1) before the settings fetch.
pub trait Platform: Send + Sync {
    /// Short identifier used in CLI `--platform` selection and log lines.
    fn name(&self) -> &'static str;

    /// Builds the base tag map passed to TIA, before any user-supplied
    /// `runtime-tags` override is applied.
    fn build_tags(&self, repo_root: &Path) -> BTreeMap<String, String>;

    /// Attempts to detect which framework this platform's repository uses,
    /// for CLIs that omit `--framework`.
    fn detect_framework(&self, repo_root: &Path) -> Option<String>;

    /// Fails fast if a prerequisite tool is missing or the repository is not
    /// initialised for this platform (e.g. no VCS metadata).
    fn sanity_check(&self, repo_root: &Path) -> Result<(), EnvironmentError>;
}

/// Reference platform adapter good enough to drive the full pipeline in
/// tests and in a real CLI invocation without any ecosystem-specific
/// tooling installed.
pub struct GenericPlatform;

impl Platform for GenericPlatform {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn build_tags(&self, repo_root: &Path) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        tags.insert("platform".to_string(), self.name().to_string());
        if let Some(dir_name) = repo_root.file_name().and_then(|n| n.to_str()) {
            tags.insert("repository.name".to_string(), dir_name.to_string());
        }
        tags
    }

    fn detect_framework(&self, _repo_root: &Path) -> Option<String> {
        Some("generic".to_string())
    }

    fn sanity_check(&self, repo_root: &Path) -> Result<(), EnvironmentError> {
        if !repo_root.exists() {
            return Err(EnvironmentError::RepoNotInitialised {
                platform: self.name().to_string(),
                reason: format!("{} does not exist", repo_root.display()),
            });
        }
        Ok(())
    }
}

/// Resolves a `--platform` value to a concrete adapter.
pub fn resolve(name: &str) -> Result<Box<dyn Platform>, crate::error::ConfigError> {
    match name {
        "generic" => Ok(Box::new(GenericPlatform)),
        other => Err(crate::error::ConfigError::UnknownPlatform(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_platform_builds_tags_from_repo_root() {
        let platform = GenericPlatform;
        let tags = platform.build_tags(Path::new("/repos/widgets"));
        assert_eq!(tags.get("platform").map(String::as_str), Some("generic"));
        assert_eq!(
            tags.get("repository.name").map(String::as_str),
            Some("widgets")
        );
    }

    #[test]
    fn sanity_check_fails_for_missing_repo_root() {
        let platform = GenericPlatform;
        let err = platform
            .sanity_check(Path::new("/definitely/not/a/real/path/xyz"))
            .unwrap_err();
        assert!(matches!(err, EnvironmentError::RepoNotInitialised { .. }));
    }

    #[test]
    fn resolve_rejects_unknown_platform() {
        assert!(resolve("nonexistent").is_err());
        assert!(resolve("generic").is_ok());
    }
}
