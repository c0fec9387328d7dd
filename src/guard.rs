//! Parent-ownership checks for nested routes.
//!
//! Writes are checked against the submitted body (403 on mismatch). Reads, deletes and
//! in-place updates are checked against the stored entity (404 on mismatch, so other
//! parents' children stay invisible).

use crate::entity::{reference_id, Entity, ID_KEY};
use crate::error::AppError;
use crate::registry::EntityRegistry;
use crate::resolver::RouteDescriptor;
use serde_json::{Map, Value};

/// The raw body must reference the path's parent as `{"<relation>": {"id": <parent id>}}`.
pub fn check_body_relation(
    descriptor: &RouteDescriptor,
    body: &Map<String, Value>,
) -> Result<(), AppError> {
    let Some(parent) = &descriptor.parent else {
        return Ok(());
    };
    let forbidden = || AppError::ForbiddenRelation {
        relation: parent.relation.clone(),
        parent_id: parent.id.clone(),
    };
    let submitted = match body.get(&parent.relation) {
        Some(Value::Object(reference)) => reference.get(ID_KEY).ok_or_else(forbidden)?,
        _ => return Err(forbidden()),
    };
    match reference_id(submitted) {
        Some(id) if id == parent.id => Ok(()),
        _ => Err(forbidden()),
    }
}

/// The fetched entity's parent relation must point at the path's parent id.
pub fn check_fetched_scope(
    descriptor: &RouteDescriptor,
    entity: &Entity,
    registry: &EntityRegistry,
) -> Result<(), AppError> {
    let Some(parent) = &descriptor.parent else {
        return Ok(());
    };
    match registry.related_id(&descriptor.entity_name, &parent.entity_name, entity) {
        Some(id) if id == parent.id => Ok(()),
        found => {
            tracing::debug!(
                entity = %descriptor.entity_name,
                parent = %parent.entity_name,
                expected = %parent.id,
                found = ?found,
                "entity outside parent scope"
            );
            Err(AppError::NotFoundInScope {
                parent: parent.entity_name.clone(),
                parent_id: parent.id.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::field_accessor;
    use crate::resolver::{resolve_path, RouteScheme};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn nested() -> RouteDescriptor {
        resolve_path(&RouteScheme::default(), "/api/orders/5/order-items/42").unwrap()
    }

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn flat_routes_skip_checks() {
        let d = resolve_path(&RouteScheme::default(), "/api/order-items/42").unwrap();
        assert!(check_body_relation(&d, &Map::new()).is_ok());
        assert!(check_fetched_scope(&d, &Entity::new(), &EntityRegistry::new()).is_ok());
    }

    #[test]
    fn body_with_matching_parent_passes() {
        assert!(check_body_relation(&nested(), &obj(json!({"order": {"id": 5}}))).is_ok());
        assert!(check_body_relation(&nested(), &obj(json!({"order": {"id": "5"}}))).is_ok());
    }

    #[test]
    fn body_without_parent_is_forbidden() {
        assert_matches!(
            check_body_relation(&nested(), &obj(json!({"quantity": 1}))),
            Err(AppError::ForbiddenRelation { .. })
        );
        assert_matches!(
            check_body_relation(&nested(), &obj(json!({"order": {"name": "x"}}))),
            Err(AppError::ForbiddenRelation { .. })
        );
        assert_matches!(
            check_body_relation(&nested(), &obj(json!({"order": 5}))),
            Err(AppError::ForbiddenRelation { .. })
        );
    }

    #[test]
    fn body_with_other_parent_is_forbidden() {
        assert_matches!(
            check_body_relation(&nested(), &obj(json!({"order": {"id": 6}}))),
            Err(AppError::ForbiddenRelation { relation, parent_id }) if relation == "order" && parent_id == "5"
        );
    }

    #[test]
    fn fetched_scope() {
        let mut registry = EntityRegistry::new();
        registry.register_accessor("OrderItem", "Order", field_accessor("order"));
        let mut item = Entity::new();
        item.insert("order".into(), json!({"id": 5}));
        assert!(check_fetched_scope(&nested(), &item, &registry).is_ok());

        item.insert("order".into(), json!({"id": 9}));
        assert_matches!(
            check_fetched_scope(&nested(), &item, &registry),
            Err(AppError::NotFoundInScope { .. })
        );
    }

    #[test]
    fn missing_accessor_hides_entity() {
        let mut item = Entity::new();
        item.insert("order".into(), json!({"id": 5}));
        assert_matches!(
            check_fetched_scope(&nested(), &item, &EntityRegistry::new()),
            Err(AppError::NotFoundInScope { .. })
        );
    }
}
