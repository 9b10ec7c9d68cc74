//! Full-discovery stream persistence
//!
//! Persists T2's raw `Test` list as JSON-lines under `tests-discovery/tests.json`
//! (spec.md §6). Written once per `plan`, regardless of whether full
//! discovery produced any tests — an empty stream records "full discovery
//! produced nothing", distinct from the file being absent.

use std::fs;

use crate::error::PersistenceError;
use crate::model::Test;

use super::layout::PlanLayout;

pub fn persist(layout: &PlanLayout, tests: &[Test]) -> Result<(), PersistenceError> {
    fs::create_dir_all(layout.discovery_dir()).map_err(|source| PersistenceError::CreateDir {
        path: layout.discovery_dir(),
        source,
    })?;

    let mut content = String::new();
    for test in tests {
        content.push_str(&serde_json::to_string(test).expect("Test serializes"));
        content.push('\n');
    }

    fs::write(layout.discovery_tests_json(), content).map_err(|source| PersistenceError::WriteFile {
        path: layout.discovery_tests_json(),
        source,
    })
}
