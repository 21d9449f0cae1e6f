//! Structural comparison of project definitions.
//!
//! Used for the round-trip check after a pull: the definition decoded back
//! out of the generated source must match the fetched one. Timestamps are
//! ignored and empty-string, empty-collection, and absent fields are all
//! treated as equivalent. Structural problems (missing entities, value or
//! count mismatches) are hard differences; unknown extra fields are
//! non-fatal warnings.

use quill_core::project::FullProjectDefinition;
use serde_json::Value;

/// Fields ignored at every depth.
const IGNORED_FIELDS: &[&str] = &["createdAt", "updatedAt"];

/// One structural difference between two definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    pub path: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for Difference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.path, self.expected, self.actual
        )
    }
}

/// Result of comparing two project definitions.
#[derive(Debug, Clone, Default)]
pub struct ProjectComparison {
    pub matches: bool,
    pub differences: Vec<Difference>,
    pub warnings: Vec<String>,
}

/// Compare two project definitions structurally.
pub fn compare_project_definitions(
    expected: &FullProjectDefinition,
    actual: &FullProjectDefinition,
) -> ProjectComparison {
    let expected_value = serde_json::to_value(expected).unwrap_or(Value::Null);
    let actual_value = serde_json::to_value(actual).unwrap_or(Value::Null);
    compare_values(&expected_value, &actual_value)
}

/// Compare two already-decoded JSON documents.
pub fn compare_values(expected: &Value, actual: &Value) -> ProjectComparison {
    let mut comparison = ProjectComparison::default();
    diff("$", expected, actual, &mut comparison);
    comparison.matches = comparison.differences.is_empty();
    comparison
}

/// True for values equivalent to "absent": null, empty string, empty
/// array, empty object.
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn summarize(value: &Value) -> String {
    match value {
        Value::Object(map) => format!("object with {} fields", map.len()),
        Value::Array(items) => format!("array of {}", items.len()),
        other => other.to_string(),
    }
}

fn diff(path: &str, expected: &Value, actual: &Value, out: &mut ProjectComparison) {
    match (expected, actual) {
        (Value::Object(expected_map), Value::Object(actual_map)) => {
            for (key, expected_value) in expected_map {
                if IGNORED_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                let child_path = format!("{}.{}", path, key);
                match actual_map.get(key) {
                    Some(actual_value) => diff(&child_path, expected_value, actual_value, out),
                    None if is_absent(expected_value) => {}
                    None => out.differences.push(Difference {
                        path: child_path,
                        expected: summarize(expected_value),
                        actual: "missing".to_string(),
                    }),
                }
            }
            for (key, actual_value) in actual_map {
                if IGNORED_FIELDS.contains(&key.as_str()) || expected_map.contains_key(key) {
                    continue;
                }
                if !is_absent(actual_value) {
                    out.warnings
                        .push(format!("{}.{}: unknown field", path, key));
                }
            }
        }
        (Value::Array(expected_items), Value::Array(actual_items)) => {
            if expected_items.len() != actual_items.len() {
                out.differences.push(Difference {
                    path: path.to_string(),
                    expected: format!("{} elements", expected_items.len()),
                    actual: format!("{} elements", actual_items.len()),
                });
                return;
            }
            for (i, (expected_item, actual_item)) in
                expected_items.iter().zip(actual_items).enumerate()
            {
                diff(&format!("{}[{}]", path, i), expected_item, actual_item, out);
            }
        }
        _ => {
            if expected == actual || (is_absent(expected) && is_absent(actual)) {
                return;
            }
            out.differences.push(Difference {
                path: path.to_string(),
                expected: summarize(expected),
                actual: summarize(actual),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identical_definitions_match() {
        let project = FullProjectDefinition {
            id: "p".to_string(),
            name: "P".to_string(),
            ..Default::default()
        };
        let comparison = compare_project_definitions(&project, &project.clone());
        assert!(comparison.matches);
        assert!(comparison.differences.is_empty());
    }

    #[test]
    fn test_timestamps_are_ignored() {
        let expected = json!({ "id": "p", "createdAt": "2026-01-01T00:00:00Z" });
        let actual = json!({ "id": "p", "createdAt": "2026-06-01T00:00:00Z" });
        assert!(compare_values(&expected, &actual).matches);
    }

    #[test]
    fn test_empty_string_equals_absent() {
        let expected = json!({ "id": "p", "description": "" });
        let actual = json!({ "id": "p" });
        assert!(compare_values(&expected, &actual).matches);

        let expected = json!({ "id": "p", "description": null });
        let actual = json!({ "id": "p", "description": "" });
        assert!(compare_values(&expected, &actual).matches);
    }

    #[test]
    fn test_missing_entity_is_a_difference() {
        let expected = json!({ "agents": { "a": { "id": "a" } } });
        let actual = json!({ "agents": {} });
        let comparison = compare_values(&expected, &actual);
        assert!(!comparison.matches);
        assert_eq!(comparison.differences[0].path, "$.agents.a");
    }

    #[test]
    fn test_count_mismatch_is_a_difference() {
        let expected = json!({ "canDelegateTo": ["a", "b"] });
        let actual = json!({ "canDelegateTo": ["a"] });
        let comparison = compare_values(&expected, &actual);
        assert!(!comparison.matches);
        assert!(comparison.differences[0].expected.contains("2 elements"));
    }

    #[test]
    fn test_unknown_field_is_a_warning_not_a_difference() {
        let expected = json!({ "id": "p" });
        let actual = json!({ "id": "p", "novelField": 42 });
        let comparison = compare_values(&expected, &actual);
        assert!(comparison.matches);
        assert_eq!(comparison.warnings.len(), 1);
        assert!(comparison.warnings[0].contains("novelField"));
    }

    #[test]
    fn test_name_mismatch_is_a_difference() {
        let expected = json!({ "name": "Weather Agent" });
        let actual = json!({ "name": "Climate Agent" });
        let comparison = compare_values(&expected, &actual);
        assert_eq!(comparison.differences.len(), 1);
        assert_eq!(comparison.differences[0].path, "$.name");
    }
}
