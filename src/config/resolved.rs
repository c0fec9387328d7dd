//! Resolved resource model: config validated and compiled for runtime use.

use crate::config::{FieldKind, ValidationRule};
use crate::error::AppError;
use crate::registry::{EntityRegistry, EntityType};
use crate::resolver::RouteScheme;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub default: Value,
    pub rules: ValidationRule,
    /// `rules.pattern`, compiled once at resolve time.
    pub pattern: Option<Regex>,
}

/// Bindable fields of one entity type, looked up by form name (`OrderItemType`).
#[derive(Clone, Debug)]
pub struct FormSpec {
    pub name: String,
    pub entity_name: String,
    pub fields: Vec<FieldSpec>,
}

impl FormSpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Drop every field except `name`. Used for single-field patches.
    pub fn retain_only(&mut self, name: &str) {
        self.fields.retain(|f| f.name == name);
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedModel {
    pub route: RouteScheme,
    pub registry: EntityRegistry,
    pub forms: HashMap<String, FormSpec>,
}

impl ResolvedModel {
    pub fn entity(&self, name: &str) -> Result<&EntityType, AppError> {
        self.registry.get(name)
    }

    pub fn form(&self, name: &str) -> Result<&FormSpec, AppError> {
        self.forms
            .get(name)
            .ok_or_else(|| AppError::UnknownForm(name.to_string()))
    }

    pub fn form_for(&self, entity_name: &str) -> Result<&FormSpec, AppError> {
        self.form(&self.route.form_name(entity_name))
    }
}
