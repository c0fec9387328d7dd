//! Config validation: naming, uniqueness and relation targets.

use crate::case::is_pascal_case;
use crate::config::ResourceConfig;
use crate::entity::ID_KEY;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;

pub fn validate(config: &ResourceConfig) -> Result<(), ConfigError> {
    if config.entities.is_empty() {
        return Err(ConfigError::Validation("at least one entity required".into()));
    }

    let mut names = HashSet::new();
    for e in &config.entities {
        if !is_pascal_case(&e.name) {
            return Err(ConfigError::InvalidEntityName(e.name.clone()));
        }
        if !names.insert(e.name.as_str()) {
            return Err(ConfigError::DuplicateEntity(e.name.clone()));
        }
    }

    for e in &config.entities {
        let mut fields = HashSet::new();
        for f in &e.fields {
            if f.name.is_empty() {
                return Err(ConfigError::Validation(format!("{}: empty field name", e.name)));
            }
            if f.name == ID_KEY {
                return Err(ConfigError::Validation(format!(
                    "{}: '{}' is managed by the store and cannot be a field",
                    e.name, ID_KEY
                )));
            }
            if !fields.insert(f.name.as_str()) {
                return Err(ConfigError::DuplicateField {
                    entity: e.name.clone(),
                    field: f.name.clone(),
                });
            }
            if let Some(target) = f.kind.target() {
                if !names.contains(target) {
                    return Err(ConfigError::MissingReference {
                        kind: "entity",
                        id: format!("{} (from {}.{})", target, e.name, f.name),
                    });
                }
            }
            if let Some(pattern) = &f.rules.pattern {
                Regex::new(pattern).map_err(|err| {
                    ConfigError::Validation(format!("{}.{}: invalid pattern: {}", e.name, f.name, err))
                })?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn config(raw: &str) -> ResourceConfig {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn accepts_valid_config() {
        let c = config(
            r#"{"entities": [
                {"name": "Order"},
                {"name": "OrderItem", "fields": [{"name": "order", "kind": {"relation": "Order"}}]}
            ]}"#,
        );
        assert!(validate(&c).is_ok());
    }

    #[test]
    fn rejects_empty_config() {
        assert_matches!(validate(&ResourceConfig::default()), Err(ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_bad_names() {
        let c = config(r#"{"entities": [{"name": "order_item"}]}"#);
        assert_matches!(validate(&c), Err(ConfigError::InvalidEntityName(_)));
        let c = config(r#"{"entities": [{"name": "Order"}, {"name": "Order"}]}"#);
        assert_matches!(validate(&c), Err(ConfigError::DuplicateEntity(_)));
    }

    #[test]
    fn rejects_unknown_relation_target() {
        let c = config(
            r#"{"entities": [{"name": "OrderItem", "fields": [{"name": "order", "kind": {"relation": "Order"}}]}]}"#,
        );
        assert_matches!(validate(&c), Err(ConfigError::MissingReference { kind: "entity", .. }));
    }

    #[test]
    fn rejects_id_and_duplicate_fields() {
        let c = config(r#"{"entities": [{"name": "Order", "fields": [{"name": "id", "kind": "integer"}]}]}"#);
        assert_matches!(validate(&c), Err(ConfigError::Validation(_)));
        let c = config(
            r#"{"entities": [{"name": "Order", "fields": [
                {"name": "note", "kind": "string"}, {"name": "note", "kind": "json"}
            ]}]}"#,
        );
        assert_matches!(validate(&c), Err(ConfigError::DuplicateField { .. }));
    }

    #[test]
    fn rejects_invalid_pattern() {
        let c = config(
            r#"{"entities": [{"name": "Order", "fields": [
                {"name": "reference", "kind": "string", "rules": {"pattern": "(["}}
            ]}]}"#,
        );
        assert_matches!(validate(&c), Err(ConfigError::Validation(_)));
    }
}
