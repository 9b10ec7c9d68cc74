//! TIA cache persistence
//!
//! Persists whatever the TIA client has accumulated (settings, skippable
//! tests, known tests, test-management tests) to the Plan Directory's
//! `cache/` subtree. Written only by T1 (spec.md §5); must happen exactly
//! once per `plan` regardless of T1's success.

use std::fs;

use crate::adapters::tia::TiaCache;
use crate::error::PersistenceError;

use super::layout::PlanLayout;

fn write_json(path: &std::path::Path, value: &impl serde::Serialize) -> Result<(), PersistenceError> {
    let content = serde_json::to_string_pretty(value).expect("cache values always serialize");
    fs::write(path, content).map_err(|source| PersistenceError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

pub fn persist(layout: &PlanLayout, cache: &TiaCache) -> Result<(), PersistenceError> {
    fs::create_dir_all(layout.cache_dir()).map_err(|source| PersistenceError::CreateDir {
        path: layout.cache_dir(),
        source,
    })?;

    write_json(&layout.settings_json(), &cache.settings)?;
    write_json(&layout.skippable_tests_json(), &cache.skippable_tests)?;
    write_json(&layout.known_tests_json(), &cache.known_tests)?;
    write_json(&layout.test_management_tests_json(), &cache.test_management_tests)?;

    Ok(())
}
