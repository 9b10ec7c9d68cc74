//! GitHub-Actions-like CI provider
//!
//! Writes `<PlanDir>/github/config` containing a single line:
//! `matrix={"include":[{"ci_node_index":0,"ci_node_total":N},...]}`,
//! consumed by an external CI configuration generator. Entries are in
//! ascending `ci_node_index` from `0` to `N-1` (spec.md §6).

use std::fs;
use std::path::Path;

use serde_json::json;

use crate::error::CiProviderError;

use super::CiProvider;

pub struct GithubActionsProvider;

impl CiProvider for GithubActionsProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    fn configure(&self, plan_dir: &Path, worker_count: u32) -> Result<(), CiProviderError> {
        if worker_count == 0 {
            return Err(CiProviderError::NonPositiveWorkerCount(0));
        }

        let include: Vec<_> = (0..worker_count)
            .map(|i| {
                json!({
                    "ci_node_index": i,
                    "ci_node_total": worker_count,
                })
            })
            .collect();
        let matrix = json!({ "include": include });

        let dir = plan_dir.join("github");
        fs::create_dir_all(&dir).map_err(|e| CiProviderError::Io {
            path: dir.clone(),
            source: e,
        })?;
        fs::set_permissions(&dir, std::os::unix::fs::PermissionsExt::from_mode(0o755)).map_err(
            |e| CiProviderError::Io {
                path: dir.clone(),
                source: e,
            },
        )?;

        let content = format!("matrix={}", serde_json::to_string(&matrix).unwrap());
        let path = dir.join("config");
        fs::write(&path, content).map_err(|e| CiProviderError::Io {
            path: path.clone(),
            source: e,
        })?;
        fs::set_permissions(&path, std::os::unix::fs::PermissionsExt::from_mode(0o644)).map_err(
            |e| CiProviderError::Io {
                path: path.clone(),
                source: e,
            },
        )?;

        Ok(())
    }
}
