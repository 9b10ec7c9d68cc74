//! Plan writer (C6)
//!
//! Persists plan artifacts under the Plan Directory. No atomic rename is
//! required: a partial plan directory is acceptable because `run` re-plans
//! when key artifacts are missing (spec.md §4.4, §4.7).

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::error::PersistenceError;
use crate::model::{Plan, PlanMetadata};

use super::layout::PlanLayout;

const DIR_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

fn create_dir(path: &Path) -> Result<(), PersistenceError> {
    fs::create_dir_all(path).map_err(|source| PersistenceError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    fs::set_permissions(path, fs::Permissions::from_mode(DIR_MODE)).map_err(|source| {
        PersistenceError::SetPermissions {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), PersistenceError> {
    fs::write(path, content).map_err(|source| PersistenceError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    fs::set_permissions(path, fs::Permissions::from_mode(FILE_MODE)).map_err(|source| {
        PersistenceError::SetPermissions {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn lines_file(paths: &[std::path::PathBuf]) -> String {
    let mut content = String::new();
    for path in paths {
        content.push_str(&path.to_string_lossy());
        content.push('\n');
    }
    content
}

/// Writes every artifact C6 owns: `test-files.txt`,
/// `skippable-percentage.txt`, `parallel-runners.txt`, and one
/// `tests-split/runner-k` per worker. For `n = 1`, `runner-0` is a byte-for-
/// byte copy of `test-files.txt` (spec.md §4.4).
pub fn write_plan(layout: &PlanLayout, plan: &Plan) -> Result<(), PersistenceError> {
    create_dir(layout.root())?;

    write_file(&layout.test_files_txt(), &lines_file(&plan.test_files))?;

    write_file(
        &layout.skippable_percentage_txt(),
        &format!("{:.2}", plan.skippable_percentage),
    )?;

    write_file(
        &layout.parallel_runners_txt(),
        &plan.worker_count.to_string(),
    )?;

    create_dir(&layout.tests_split_dir())?;
    for (index, files) in plan.per_worker.iter().enumerate() {
        write_file(&layout.runner_file(index as u32), &lines_file(files))?;
    }

    let metadata = PlanMetadata::now();
    write_file(
        &layout.metadata_json(),
        &serde_json::to_string_pretty(&metadata).expect("PlanMetadata serializes"),
    )?;

    Ok(())
}
