//! Structural shape of a JSON value, used to compare repeated responses.

use std::collections::BTreeSet;

use serde_json::Value;

/// Returns the set of field paths present in `value`.
///
/// Object keys become dotted paths (`user.id`); array elements are folded
/// into a single `[]` segment, so every element contributes to the same
/// paths (`[].userId`). Values themselves are ignored: two bodies with the
/// same fields but different contents have the same shape.
#[must_use]
pub fn field_set(value: &Value) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    collect(value, "", &mut paths);
    paths
}

fn collect(value: &Value, prefix: &str, paths: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                paths.insert(path.clone());
                collect(child, &path, paths);
            }
        }
        Value::Array(items) => {
            let path = if prefix.is_empty() {
                "[]".to_string()
            } else {
                format!("{prefix}[]")
            };
            for item in items {
                collect(item, &path, paths);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_object_shape_ignores_values() {
        let a = json!({"id": 1, "title": "a", "meta": {"tags": ["x"]}});
        let b = json!({"id": 2, "title": "b", "meta": {"tags": []}});
        assert_eq!(field_set(&a), field_set(&b));
        assert!(field_set(&a).contains("meta.tags"));
    }

    #[test]
    fn test_array_elements_are_unioned() {
        let value = json!([{"id": 1}, {"id": 2, "extra": true}]);
        let shape = field_set(&value);
        assert_eq!(
            shape.into_iter().collect::<Vec<_>>(),
            vec!["[].extra".to_string(), "[].id".to_string()]
        );
    }

    #[test]
    fn test_scalars_have_empty_shape() {
        assert!(field_set(&json!(42)).is_empty());
        assert!(field_set(&json!({})).is_empty());
    }
}
