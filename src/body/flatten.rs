//! Collapse nested relation objects to their ids before form binding.
//!
//! A read returns relations as `{"id": 7, ...}` objects. Writes expect bare ids, so a
//! payload read back and resubmitted must be flattened first. Depth is capped at three.

use crate::entity::{Entity, ID_KEY};
use serde_json::{Map, Value};

const MAX_DEPTH: u8 = 3;

/// Flatten a request body. Never fails: unexpected shapes pass through.
pub fn flatten(body: &Map<String, Value>) -> Entity {
    body.iter()
        .map(|(k, v)| (k.clone(), flatten_value(v, 1)))
        .collect()
}

fn flatten_value(value: &Value, depth: u8) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(id) = map.get(ID_KEY) {
                id.clone()
            } else if depth < MAX_DEPTH {
                Value::Object(
                    map.iter()
                        .map(|(k, v)| (k.clone(), flatten_value(v, depth + 1)))
                        .collect(),
                )
            } else {
                value.clone()
            }
        }
        Value::Array(items) if depth < MAX_DEPTH => Value::Array(
            items.iter().map(|v| flatten_value(v, depth + 1)).collect(),
        ),
        other => other.clone(),
    }
}

/// Whether any object carrying an `id` remains at depth one to three.
pub fn has_nested_references(body: &Map<String, Value>) -> bool {
    fn walk(value: &Value, depth: u8) -> bool {
        if depth > MAX_DEPTH {
            return false;
        }
        match value {
            Value::Object(map) => {
                map.contains_key(ID_KEY) || map.values().any(|v| walk(v, depth + 1))
            }
            Value::Array(items) => items.iter().any(|v| walk(v, depth + 1)),
            _ => false,
        }
    }
    body.values().any(|v| walk(v, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn collapses_relation_object_to_id() {
        let out = flatten(&obj(json!({"parent": {"id": 7, "name": "x"}})));
        assert_eq!(Value::Object(out), json!({"parent": 7}));
    }

    #[test]
    fn collapses_keyed_collection() {
        let out = flatten(&obj(json!({"tags": {"0": {"id": 1}, "1": {"id": 2}}})));
        assert_eq!(Value::Object(out), json!({"tags": {"0": 1, "1": 2}}));
    }

    #[test]
    fn collapses_arrays_of_references() {
        let out = flatten(&obj(json!({"tags": [{"id": 1}, {"id": 2}], "scores": [1, 2]})));
        assert_eq!(Value::Object(out), json!({"tags": [1, 2], "scores": [1, 2]}));
    }

    #[test]
    fn scalars_pass_through() {
        let body = obj(json!({"name": "x", "qty": 3, "active": true, "note": null}));
        assert_eq!(flatten(&body), body);
    }

    #[test]
    fn three_levels_deep() {
        let out = flatten(&obj(json!({
            "meta": {"owner": {"team": {"id": 4}, "plain": "y"}}
        })));
        assert_eq!(Value::Object(out), json!({"meta": {"owner": {"team": 4, "plain": "y"}}}));
    }

    #[test]
    fn stops_below_third_level() {
        let body = obj(json!({"a": {"b": {"c": {"d": {"id": 1}}}}}));
        let out = flatten(&body);
        assert_eq!(Value::Object(out), json!({"a": {"b": {"c": {"d": {"id": 1}}}}}));
    }

    #[test]
    fn preserves_key_order() {
        let body = obj(json!({"z": {"id": 1}, "a": 2, "m": {"id": 3}}));
        let keys: Vec<_> = flatten(&body).keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn read_then_flatten_leaves_no_references() {
        let read_back = obj(json!({
            "id": 42,
            "quantity": 2,
            "order": {"id": 5, "reference": "A-1"},
            "tags": [{"id": 1, "label": "red"}, {"id": 2, "label": "blue"}],
            "extra": {"warehouse": {"id": 9}}
        }));
        assert!(has_nested_references(&read_back));
        let flat = flatten(&read_back);
        assert!(!has_nested_references(&flat));
    }
}
