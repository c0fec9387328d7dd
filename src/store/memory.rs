//! In-memory store: one ordered collection per locator with auto-increment ids.

use crate::entity::{entity_id, Entity, EntityLocator, ID_KEY};
use crate::error::AppError;
use crate::service::{ListQuery, Page, PersistenceRepository, ScopeConstraint};
use crate::store::ListParams;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Collection {
    next_id: i64,
    rows: Vec<Entity>,
}

impl Collection {
    fn position(&self, id: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| entity_id(row).as_deref() == Some(id))
    }
}

pub struct MemoryRepository {
    collections: RwLock<HashMap<EntityLocator, Collection>>,
    default_page_size: u32,
}

impl MemoryRepository {
    pub fn new(default_page_size: u32) -> Self {
        MemoryRepository {
            collections: RwLock::new(HashMap::new()),
            default_page_size,
        }
    }
}

#[async_trait]
impl PersistenceRepository for MemoryRepository {
    async fn find(&self, locator: &EntityLocator, id: &str) -> Result<Option<Entity>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(locator)
            .and_then(|c| c.position(id).map(|i| c.rows[i].clone())))
    }

    async fn persist(&self, locator: &EntityLocator, mut entity: Entity) -> Result<Entity, AppError> {
        let mut collections = self.collections.write().await;
        let collection = collections.entry(locator.clone()).or_default();
        match entity_id(&entity) {
            Some(id) => {
                if let Ok(n) = id.parse::<i64>() {
                    collection.next_id = collection.next_id.max(n);
                }
                match collection.position(&id) {
                    Some(i) => collection.rows[i] = entity.clone(),
                    None => collection.rows.push(entity.clone()),
                }
            }
            None => {
                collection.next_id += 1;
                // Keep `id` first so stored entities read naturally.
                let mut with_id = Entity::new();
                with_id.insert(ID_KEY.to_string(), Value::Number(collection.next_id.into()));
                with_id.extend(entity.into_iter().filter(|(k, _)| k != ID_KEY));
                entity = with_id;
                collection.rows.push(entity.clone());
            }
        }
        tracing::debug!(locator = %locator, id = ?entity.get(ID_KEY), "persisted");
        Ok(entity)
    }

    async fn remove(&self, locator: &EntityLocator, id: &str) -> Result<bool, AppError> {
        let mut collections = self.collections.write().await;
        let Some(collection) = collections.get_mut(locator) else {
            return Ok(false);
        };
        match collection.position(id) {
            Some(i) => {
                collection.rows.remove(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn query(
        &self,
        locator: &EntityLocator,
        query: &ListQuery,
        scope: Option<&ScopeConstraint>,
    ) -> Result<Page, AppError> {
        let params = ListParams::parse(query, self.default_page_size);
        let collections = self.collections.read().await;
        let mut rows: Vec<&Entity> = collections
            .get(locator)
            .map(|c| c.rows.iter().filter(|r| params.matches(r, scope)).collect())
            .unwrap_or_default();
        if !params.sort.is_empty() {
            rows.sort_by(|a, b| params.compare(a, b));
        }
        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.page_size as usize)
            .cloned()
            .collect();
        Ok(Page {
            items,
            total,
            page: params.page,
            page_size: params.page_size,
        })
    }
}
