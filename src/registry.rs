//! Entity type registry and relation accessors, resolved by exact name.

use crate::entity::{reference_id, Entity, EntityLocator};
use crate::error::AppError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a blank instance of an entity type.
pub type EntityFactory = Arc<dyn Fn() -> Entity + Send + Sync>;

/// Reads a related entity (or its id) off an instance.
pub type RelationAccessor = Arc<dyn Fn(&Entity) -> Option<Value> + Send + Sync>;

#[derive(Clone)]
pub struct EntityType {
    pub name: String,
    pub locator: EntityLocator,
    factory: EntityFactory,
}

impl EntityType {
    pub fn new(name: impl Into<String>, locator: EntityLocator, factory: EntityFactory) -> Self {
        EntityType {
            name: name.into(),
            locator,
            factory,
        }
    }

    pub fn new_instance(&self) -> Entity {
        (self.factory)()
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

/// Accessor reading a relation stored under `field`.
pub fn field_accessor(field: &str) -> RelationAccessor {
    let field = field.to_string();
    Arc::new(move |entity: &Entity| entity.get(&field).cloned())
}

/// Factory cloning a fixed template.
pub fn template_factory(template: Entity) -> EntityFactory {
    Arc::new(move || template.clone())
}

#[derive(Clone, Default)]
pub struct EntityRegistry {
    types: HashMap<String, EntityType>,
    /// Keyed by (entity type, PascalCase relation name).
    accessors: HashMap<(String, String), RelationAccessor>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entity_type: EntityType) {
        self.types.insert(entity_type.name.clone(), entity_type);
    }

    pub fn register_accessor(
        &mut self,
        entity_name: impl Into<String>,
        relation: impl Into<String>,
        accessor: RelationAccessor,
    ) {
        self.accessors
            .insert((entity_name.into(), relation.into()), accessor);
    }

    pub fn get(&self, name: &str) -> Result<&EntityType, AppError> {
        self.types
            .get(name)
            .ok_or_else(|| AppError::UnknownEntityType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn accessor(&self, entity_name: &str, relation: &str) -> Option<&RelationAccessor> {
        self.accessors
            .get(&(entity_name.to_string(), relation.to_string()))
    }

    /// Id of the related entity reached through `relation`, if the accessor exists and the relation is set.
    pub fn related_id(&self, entity_name: &str, relation: &str, entity: &Entity) -> Option<String> {
        let accessor = self.accessor(entity_name, relation)?;
        (**accessor)(entity).as_ref().and_then(reference_id)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut relations: Vec<_> = self.accessors.keys().collect();
        relations.sort();
        f.debug_struct("EntityRegistry")
            .field("types", &self.types.values().collect::<Vec<_>>())
            .field("relations", &relations)
            .finish()
    }
}
