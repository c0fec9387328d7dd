//! Load the resource document from disk and resolve it into the runtime model.

use crate::case::upper_first;
use crate::config::resolved::{FieldSpec, FormSpec, ResolvedModel};
use crate::config::types::*;
use crate::config::validate;
use crate::entity::Entity;
use crate::error::ConfigError;
use crate::registry::{field_accessor, template_factory, EntityRegistry, EntityType};
use crate::resolver::{PathSegments, RouteScheme};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Build the resolved model from config (validates first).
///
/// Every entity gets a registry entry whose factory yields its field defaults, a form named
/// after the route scheme, and one relation accessor per relation field keyed by the
/// PascalCase field name (`order` -> `Order`).
pub fn resolve(config: &ResourceConfig) -> Result<ResolvedModel, ConfigError> {
    validate(config)?;

    let route = RouteScheme {
        prefix: PathSegments::parse(&config.route.prefix).as_slice().to_vec(),
        entity_namespace: config.route.entity_namespace.clone(),
        form_folder: config.route.form_folder.clone(),
    };

    let mut registry = EntityRegistry::new();
    let mut forms = HashMap::new();

    for e in &config.entities {
        let mut fields = Vec::with_capacity(e.fields.len());
        let mut template = Entity::new();
        for f in &e.fields {
            let default = f.default.clone().unwrap_or(Value::Null);
            template.insert(f.name.clone(), default.clone());
            let pattern = match &f.rules.pattern {
                Some(p) => Some(Regex::new(p).map_err(|err| {
                    ConfigError::Validation(format!("{}.{}: invalid pattern: {}", e.name, f.name, err))
                })?),
                None => None,
            };
            if f.kind.target().is_some() {
                registry.register_accessor(e.name.clone(), upper_first(&f.name), field_accessor(&f.name));
            }
            fields.push(FieldSpec {
                name: f.name.clone(),
                kind: f.kind.clone(),
                default,
                rules: f.rules.clone(),
                pattern,
            });
        }

        registry.register(EntityType::new(
            e.name.clone(),
            route.locator(&e.name),
            template_factory(template),
        ));
        let form_name = route.form_name(&e.name);
        forms.insert(
            form_name.clone(),
            FormSpec {
                name: form_name,
                entity_name: e.name.clone(),
                fields,
            },
        );
    }

    tracing::debug!(entities = registry.len(), prefix = %route.mount_path(), "resolved resource model");
    Ok(ResolvedModel {
        route,
        registry,
        forms,
    })
}

/// Parse a resource document from JSON text.
pub fn parse_config(raw: &str) -> Result<ResourceConfig, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::Load(e.to_string()))
}

/// Read a resource document from a JSON file.
pub async fn load_from_file(path: impl AsRef<Path>) -> Result<ResourceConfig, ConfigError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    parse_config(&raw)
}
