//! Persistence collaborator contract.

use crate::entity::{Entity, EntityLocator};
use crate::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// List parameters passed through from the query string without interpretation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

/// Restricts a list to children of one parent instance: `<relation>.id == parent_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeConstraint {
    pub relation: String,
    pub parent_id: String,
}

/// One page of a list query.
#[derive(Clone, Debug, Serialize)]
pub struct Page {
    pub items: Vec<Entity>,
    pub total: u64,
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

#[async_trait]
pub trait PersistenceRepository: Send + Sync {
    async fn find(&self, locator: &EntityLocator, id: &str) -> Result<Option<Entity>, AppError>;

    /// Insert or replace. Entities without an id are assigned one; the stored entity is returned.
    async fn persist(&self, locator: &EntityLocator, entity: Entity) -> Result<Entity, AppError>;

    /// Returns whether a row was removed.
    async fn remove(&self, locator: &EntityLocator, id: &str) -> Result<bool, AppError>;

    async fn query(
        &self,
        locator: &EntityLocator,
        query: &ListQuery,
        scope: Option<&ScopeConstraint>,
    ) -> Result<Page, AppError>;
}
