//! Entities are ordered JSON objects carrying their identity under `"id"`.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

pub type Entity = Map<String, Value>;

pub const ID_KEY: &str = "id";

/// Identifier handed to the persistence collaborator to pick a collection, e.g. `entities::OrderItem`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityLocator(String);

impl EntityLocator {
    pub fn new(namespace: &str, entity_name: &str) -> Self {
        if namespace.is_empty() {
            EntityLocator(entity_name.to_string())
        } else {
            EntityLocator(format!("{}::{}", namespace, entity_name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render a scalar id for comparison: `5`, `5.0` and `"5"` are the same id. Non-scalars have no id form.
pub fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_id(n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integral floats render as integers.
fn number_id(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// Id of an entity or relation reference: either a bare scalar or an object with `id`.
pub fn reference_id(v: &Value) -> Option<String> {
    match v {
        Value::Object(m) => m.get(ID_KEY).and_then(id_string),
        other => id_string(other),
    }
}

pub fn entity_id(entity: &Entity) -> Option<String> {
    entity.get(ID_KEY).and_then(id_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loose_id_comparison() {
        assert_eq!(id_string(&json!(5)), Some("5".into()));
        assert_eq!(id_string(&json!("5")), Some("5".into()));
        assert_eq!(id_string(&json!(null)), None);
    }

    #[test]
    fn integral_floats_match_integer_ids() {
        assert_eq!(id_string(&json!(5.0)), id_string(&json!("5")));
        assert_eq!(id_string(&json!(-3.0)), Some("-3".into()));
        assert_eq!(id_string(&json!(5.5)), Some("5.5".into()));
    }

    #[test]
    fn reference_id_reads_objects_and_scalars() {
        assert_eq!(reference_id(&json!({"id": 7, "name": "x"})), Some("7".into()));
        assert_eq!(reference_id(&json!(7)), Some("7".into()));
        assert_eq!(reference_id(&json!({"name": "x"})), None);
    }

    #[test]
    fn locator_formats_namespace() {
        assert_eq!(EntityLocator::new("entities", "Order").to_string(), "entities::Order");
        assert_eq!(EntityLocator::new("", "Order").as_str(), "Order");
    }
}
