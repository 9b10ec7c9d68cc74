//! Worker environment templating
//!
//! For each `(key, value_template)` pair, produces `(key, value with the
//! literal placeholder "{{nodeIndex}}" replaced by the worker's global
//! index)`. Replacement is non-recursive: the substituted text is not
//! re-scanned for further placeholders (spec.md §4.6).

use crate::model::WorkerEnv;

const PLACEHOLDER: &str = "{{nodeIndex}}";

/// Materialises `env` for global worker index `index`.
pub fn materialise(env: &WorkerEnv, index: u32) -> Vec<(String, String)> {
    env.0
        .iter()
        .map(|(key, template)| (key.clone(), template.replace(PLACEHOLDER, &index.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_node_index_placeholder() {
        let env = WorkerEnv(vec![("NODE_INDEX".to_string(), "{{nodeIndex}}".to_string())]);
        let materialised = materialise(&env, 20000);
        assert_eq!(materialised, vec![("NODE_INDEX".to_string(), "20000".to_string())]);
    }

    #[test]
    fn leaves_other_occurrences_untouched() {
        let env = WorkerEnv(vec![(
            "DB_NAME".to_string(),
            "shard_{{nodeIndex}}_db".to_string(),
        )]);
        let materialised = materialise(&env, 7);
        assert_eq!(
            materialised,
            vec![("DB_NAME".to_string(), "shard_7_db".to_string())]
        );
    }

    #[test]
    fn idempotent_on_repeated_application_with_same_index() {
        let env = WorkerEnv(vec![("X".to_string(), "{{nodeIndex}}".to_string())]);
        let first = materialise(&env, 3);
        // Re-applying materialise to a WorkerEnv built from the already
        // materialised output (which contains no more placeholders) yields
        // the same result, since substitution is non-recursive.
        let second_env = WorkerEnv(first.clone());
        let second = materialise(&second_env, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn non_recursive_when_substituted_text_contains_placeholder_literal() {
        // If a value template's replacement text happened to spell out the
        // placeholder itself, it must not be re-scanned.
        let env = WorkerEnv(vec![(
            "WEIRD".to_string(),
            "{{node".to_string() + "Index}}ignored",
        )]);
        let materialised = materialise(&env, 1);
        assert_eq!(materialised[0].1, "1ignored");
    }

    #[test]
    fn no_placeholder_means_no_change() {
        let env = WorkerEnv(vec![("STATIC".to_string(), "value".to_string())]);
        assert_eq!(materialise(&env, 5), vec![("STATIC".to_string(), "value".to_string())]);
    }
}
