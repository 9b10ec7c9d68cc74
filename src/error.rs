//! Typed error taxonomy
//!
//! Each variant here corresponds to one of the error kinds the planner and
//! dispatcher can surface. Components return these typed errors; command
//! handlers in [`crate::commands`] wrap them in `anyhow::Error` (via `?`)
//! and translate the leaf kind into a process exit code.

use std::path::PathBuf;

/// Invalid user input: unsupported platform/framework, malformed JSON,
/// or a CI adapter asked to configure a non-positive worker count.
///
/// Fatal at the point of origin; never retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown platform adapter: {0}")]
    UnknownPlatform(String),

    #[error("unknown framework adapter: {0}")]
    UnknownFramework(String),

    #[error("unknown CI provider: {0}")]
    UnknownCiProvider(String),

    #[error("malformed runtime-tags JSON: {0}")]
    MalformedRuntimeTags(#[source] serde_json::Error),

    #[error("malformed worker-env entry {0:?}: expected K=V")]
    MalformedWorkerEnv(String),
}

/// A prerequisite tool is missing, or the repository is not initialised for
/// the selected platform. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error("required tool not found on PATH: {0}")]
    ToolMissing(String),

    #[error("repository not initialised for platform {platform}: {reason}")]
    RepoNotInitialised { platform: String, reason: String },
}

/// A framework adapter failed to enumerate tests.
///
/// Full discovery (T2) failures are logged and swallowed (fallback to fast
/// discovery). Fast discovery (T3) failures are always fatal; callers
/// distinguish the two by which adapter method they invoked.
#[derive(Debug, thiserror::Error)]
#[error("test discovery failed: {0}")]
pub struct DiscoveryError(pub String);

/// A remote TIA call failed after retries. Logged; the skippable set is
/// treated as empty and the planner continues using fast discovery.
#[derive(Debug, thiserror::Error)]
#[error("TIA request failed: {0}")]
pub struct TiaTransientError(pub String);

/// The TIA client failed to initialise at all. Fatal for the planner.
#[derive(Debug, thiserror::Error)]
#[error("TIA client initialisation failed: {0}")]
pub struct TiaFatalError(pub String);

/// The Plan Directory could not be written. Fatal.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to set permissions on {path}: {source}")]
    SetPermissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A worker subprocess exited non-zero, could not be spawned, or panicked.
/// Reported after all peers have terminated.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("worker {index} failed to spawn: {source}")]
    SpawnFailed {
        index: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("worker {index} exited with status {status}")]
    NonZeroExit { index: u32, status: String },

    #[error("worker {index} panicked")]
    WorkerPanicked { index: u32 },

    #[error("assigned slice not found: {0}")]
    MissingSlice(PathBuf),
}

/// A CI-provider adapter rejected its input or failed to write its
/// configuration file. Logged as a warning by the planner: CI-provider
/// configuration failure does not block plan completion (spec.md §7).
#[derive(Debug, thiserror::Error)]
pub enum CiProviderError {
    #[error("configure() called with non-positive worker count: {0}")]
    NonPositiveWorkerCount(i64),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `parallel-runners.txt` exists but is unparseable, or a required
/// `tests-split/runner-{idx}` file is absent. Fatal; never guessed.
#[derive(Debug, thiserror::Error)]
pub enum PlanCorruption {
    #[error("{path}: expected a non-negative integer, found {content:?}")]
    MalformedWorkerCount { path: PathBuf, content: String },

    #[error("{0}: required plan artifact is missing")]
    MissingArtifact(PathBuf),
}
