//! Path normalisation
//!
//! When `plan` runs from a subdirectory of a repository, full-discovery test
//! paths may be repo-root-relative while workers expect CWD-relative paths.
//! [`strip_cwd_prefix`] computes the CWD-relative prefix of the working
//! directory once and strips it from test paths that begin with it.
//! Absolute paths and paths not prefixed by it are left unchanged; if the
//! repo root cannot be determined, paths are not modified (spec.md §9).

use std::path::{Path, PathBuf};

/// Strips `prefix` (the repo-root-relative path of the current working
/// directory) from the front of `path`, if present.
///
/// `prefix` is typically produced once per `plan` invocation by
/// [`cwd_prefix_within`] and then applied to every discovered test path.
pub fn strip_cwd_prefix(path: &Path, prefix: Option<&Path>) -> PathBuf {
    let Some(prefix) = prefix else {
        return path.to_path_buf();
    };
    if prefix.as_os_str().is_empty() || path.is_absolute() {
        return path.to_path_buf();
    }
    match path.strip_prefix(prefix) {
        Ok(stripped) => stripped.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}

/// Computes the path of `cwd` relative to `repo_root`, for use as the
/// `prefix` argument to [`strip_cwd_prefix`]. Returns `None` if `cwd` is not
/// rooted inside `repo_root`.
pub fn cwd_prefix_within(repo_root: &Path, cwd: &Path) -> Option<PathBuf> {
    cwd.strip_prefix(repo_root).ok().map(|p| p.to_path_buf())
}
