//! Raw resource config types matching the JSON document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_entity_namespace")]
    pub entity_namespace: String,
    #[serde(default)]
    pub form_folder: Option<String>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        RouteConfig {
            prefix: default_prefix(),
            entity_namespace: default_entity_namespace(),
            form_folder: None,
        }
    }
}

fn default_prefix() -> String {
    "/api".into()
}

fn default_entity_namespace() -> String {
    "entities".into()
}

/// Field type. Relations name their target entity type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Json,
    /// Reference to one entity, submitted as its id.
    Relation(String),
    /// References to many entities, submitted as a list (or index-keyed object) of ids.
    Relations(String),
}

impl FieldKind {
    pub fn target(&self) -> Option<&str> {
        match self {
            FieldKind::Relation(t) | FieldKind::Relations(t) => Some(t.as_str()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub kind: FieldKind,
    /// Value a freshly created entity starts with. Null when absent.
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub rules: ValidationRule,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityConfig {
    /// PascalCase singular type name (`OrderItem`), reached at `/order-items`.
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// Whole resource document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub route: RouteConfig,
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}
