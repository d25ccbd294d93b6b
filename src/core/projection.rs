//! Trimming of fetched entities to the selected fields
//!
//! Repositories may return more than was asked for (eager relations, computed
//! columns). [`pick_by_config`] keeps only the selected fields and relations
//! of a JSON entity, or of every entity of a JSON array.

use serde_json::{Map, Value};

use super::query::{ListQueryConfig, RetrieveConfig};

/// Keep only the listed paths of `value`
///
/// Paths may be dotted (`items.title`); arrays along the way are projected
/// element-wise. When both lists are empty the value is returned unchanged.
pub fn pick_by_config<S: AsRef<str>>(value: &Value, select: &[S], relations: &[S]) -> Value {
    let paths: Vec<Vec<&str>> = select
        .iter()
        .chain(relations)
        .map(|path| path.as_ref().split('.').collect())
        .collect();

    if paths.is_empty() {
        return value.clone();
    }

    match value {
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| pick(item, &paths)).collect())
        }
        other => pick(other, &paths),
    }
}

impl ListQueryConfig {
    /// Project `value` onto this config's select and relations
    pub fn pick(&self, value: &Value) -> Value {
        pick_by_config(
            value,
            self.select.as_deref().unwrap_or(&[]),
            self.relations.as_slice(),
        )
    }
}

impl RetrieveConfig {
    /// Project `value` onto this config's select and relations
    pub fn pick(&self, value: &Value) -> Value {
        pick_by_config(
            value,
            self.select.as_deref().unwrap_or(&[]),
            self.relations.as_slice(),
        )
    }
}

fn pick(value: &Value, paths: &[Vec<&str>]) -> Value {
    let mut out = Value::Object(Map::new());
    for path in paths {
        merge_path(&mut out, value, path);
    }
    out
}

/// Copy the value at `path` from `source` into `target`, creating the
/// intermediate objects
fn merge_path(target: &mut Value, source: &Value, path: &[&str]) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };

    match source {
        Value::Array(items) => {
            // Project every element onto the same path
            if !target.is_array() {
                *target = Value::Array(vec![Value::Object(Map::new()); items.len()]);
            }
            if let Value::Array(targets) = target {
                for (slot, item) in targets.iter_mut().zip(items) {
                    merge_path(slot, item, path);
                }
            }
        }
        Value::Object(fields) => {
            let Some(child) = fields.get(*head) else {
                return;
            };
            let Value::Object(target_fields) = target else {
                return;
            };

            if rest.is_empty() || !(child.is_object() || child.is_array()) {
                target_fields.insert(head.to_string(), child.clone());
                return;
            }

            let slot = target_fields
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            merge_path(slot, child, rest);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order() -> Value {
        json!({
            "id": "order_1",
            "status": "pending",
            "email": "buyer@example.com",
            "customer": { "id": "cus_1", "email": "buyer@example.com", "phone": "555" },
            "items": [
                { "id": "item_1", "title": "Shirt", "quantity": 2 },
                { "id": "item_2", "title": "Hat", "quantity": 1 }
            ]
        })
    }

    #[test]
    fn test_empty_lists_return_value_unchanged() {
        let none: &[&str] = &[];
        assert_eq!(pick_by_config(&order(), none, none), order());
    }

    #[test]
    fn test_top_level_fields_and_relations() {
        let picked = pick_by_config(&order(), &["id", "status"], &["customer"]);
        assert_eq!(
            picked,
            json!({
                "id": "order_1",
                "status": "pending",
                "customer": { "id": "cus_1", "email": "buyer@example.com", "phone": "555" }
            })
        );
    }

    #[test]
    fn test_nested_paths_through_arrays() {
        let picked = pick_by_config(&order(), &["id", "items.title", "customer.email"], &[]);
        assert_eq!(
            picked,
            json!({
                "id": "order_1",
                "items": [{ "title": "Shirt" }, { "title": "Hat" }],
                "customer": { "email": "buyer@example.com" }
            })
        );
    }

    #[test]
    fn test_arrays_of_entities() {
        let orders = json!([order(), order()]);
        let picked = pick_by_config(&orders, &["id"], &[]);
        assert_eq!(picked, json!([{ "id": "order_1" }, { "id": "order_1" }]));
    }

    #[test]
    fn test_missing_paths_are_skipped() {
        let picked = pick_by_config(&order(), &["id", "unknown", "customer.unknown"], &[]);
        assert_eq!(picked, json!({ "id": "order_1", "customer": {} }));
    }

    #[test]
    fn test_retrieve_config_pick() {
        let config = RetrieveConfig {
            select: Some(vec!["id".to_string()]),
            relations: vec!["items".to_string()],
        };
        let picked = config.pick(&order());
        assert_eq!(picked["id"], "order_1");
        assert_eq!(picked["items"].as_array().map(Vec::len), Some(2));
        assert!(picked.get("email").is_none());
    }
}
