//! Generic CRUD over resolved routes: guard, bind, persist, emit.

use crate::body::{flatten, has_nested_references, select_patch_field};
use crate::config::ResolvedModel;
use crate::entity::{Entity, EntityLocator};
use crate::error::AppError;
use crate::events::{EventSink, LifecycleEvent};
use crate::guard::{check_body_relation, check_fetched_scope};
use crate::resolver::RouteDescriptor;
use crate::service::{
    BindContext, BindRequest, FormBinder, ListQuery, Page, PersistenceRepository, ScopeConstraint,
    SubmitMode,
};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Result of a save: collection routes create, single-instance routes update.
#[derive(Clone, Debug, PartialEq)]
pub enum SaveOutcome {
    Created(Entity),
    Updated(Entity),
}

impl SaveOutcome {
    pub fn entity(&self) -> &Entity {
        match self {
            SaveOutcome::Created(e) | SaveOutcome::Updated(e) => e,
        }
    }

    pub fn into_entity(self) -> Entity {
        match self {
            SaveOutcome::Created(e) | SaveOutcome::Updated(e) => e,
        }
    }
}

#[derive(Clone)]
pub struct CrudService {
    model: Arc<ResolvedModel>,
    repository: Arc<dyn PersistenceRepository>,
    binder: Arc<dyn FormBinder>,
    events: Arc<dyn EventSink>,
}

impl CrudService {
    pub fn new(
        model: Arc<ResolvedModel>,
        repository: Arc<dyn PersistenceRepository>,
        binder: Arc<dyn FormBinder>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        CrudService {
            model,
            repository,
            binder,
            events,
        }
    }

    pub fn model(&self) -> &ResolvedModel {
        &self.model
    }

    /// Create on collection routes, full update on single-instance routes.
    pub async fn save(&self, route: &RouteDescriptor, body: &Map<String, Value>) -> Result<SaveOutcome, AppError> {
        let entity_type = self.model.entity(&route.entity_name)?;
        check_body_relation(route, body)?;
        let payload = payload_of(route, body);
        let form = self.model.route.form_name(&route.entity_name);

        let Some(id) = route.target_id.as_deref() else {
            let bound = self
                .binder
                .bind(BindRequest {
                    form: &form,
                    entity: entity_type.new_instance(),
                    payload: &payload,
                    mode: SubmitMode::Create,
                    context: self.context(None),
                })
                .await?;
            let stored = self.repository.persist(&entity_type.locator, bound).await?;
            self.events
                .publish(
                    LifecycleEvent::created(&route.entity_name, stored.clone())
                        .with_request_body(Value::Object(body.clone())),
                )
                .await;
            return Ok(SaveOutcome::Created(stored));
        };

        let existing = self.find_in_scope(route, &entity_type.locator, id).await?;
        let bound = self
            .binder
            .bind(BindRequest {
                form: &form,
                entity: existing.clone(),
                payload: &payload,
                mode: SubmitMode::Replace,
                context: self.context(Some(id)),
            })
            .await?;
        let stored = self.repository.persist(&entity_type.locator, bound).await?;
        self.events
            .publish(
                LifecycleEvent::updated(&route.entity_name, stored.clone(), existing)
                    .with_request_body(Value::Object(body.clone())),
            )
            .await;
        Ok(SaveOutcome::Updated(stored))
    }

    pub async fn detail(&self, route: &RouteDescriptor) -> Result<Entity, AppError> {
        let entity_type = self.model.entity(&route.entity_name)?;
        let id = target_id(route)?;
        self.find_in_scope(route, &entity_type.locator, id).await
    }

    pub async fn delete(&self, route: &RouteDescriptor) -> Result<(), AppError> {
        let entity_type = self.model.entity(&route.entity_name)?;
        let id = target_id(route)?;
        let existing = self.find_in_scope(route, &entity_type.locator, id).await?;
        if !self.repository.remove(&entity_type.locator, id).await? {
            return Err(not_found(&route.entity_name, id));
        }
        self.events
            .publish(LifecycleEvent::deleted(&route.entity_name, existing))
            .await;
        Ok(())
    }

    pub async fn list(&self, route: &RouteDescriptor, query: &ListQuery) -> Result<Page, AppError> {
        let entity_type = self.model.entity(&route.entity_name)?;
        self.repository.query(&entity_type.locator, query, None).await
    }

    /// Children of one parent instance. The parent must exist.
    pub async fn list_sub(&self, route: &RouteDescriptor, query: &ListQuery) -> Result<Page, AppError> {
        let Some(parent) = &route.parent else {
            return self.list(route, query).await;
        };
        let entity_type = self.model.entity(&route.entity_name)?;
        let parent_type = self.model.entity(&parent.entity_name)?;
        if self
            .repository
            .find(&parent_type.locator, &parent.id)
            .await?
            .is_none()
        {
            return Err(not_found(&parent.entity_name, &parent.id));
        }
        let scope = ScopeConstraint {
            relation: parent.relation.clone(),
            parent_id: parent.id.clone(),
        };
        self.repository
            .query(&entity_type.locator, query, Some(&scope))
            .await
    }

    /// Update the last field of the body only. Empty bodies fail before any lookup.
    pub async fn patch(&self, route: &RouteDescriptor, body: &Map<String, Value>) -> Result<Entity, AppError> {
        let entity_type = self.model.entity(&route.entity_name)?;
        let id = target_id(route)?;
        let field = select_patch_field(body)?;
        let existing = self.find_in_scope(route, &entity_type.locator, id).await?;
        let payload = payload_of(route, body);
        let form = self.model.route.form_name(&route.entity_name);
        let bound = self
            .binder
            .bind(BindRequest {
                form: &form,
                entity: existing.clone(),
                payload: &payload,
                mode: SubmitMode::Patch { field: field.clone() },
                context: self.context(Some(id)),
            })
            .await?;
        let stored = self.repository.persist(&entity_type.locator, bound).await?;
        self.events
            .publish(
                LifecycleEvent::patched(&route.entity_name, &field, stored.clone(), existing)
                    .with_request_body(Value::Object(body.clone())),
            )
            .await;
        Ok(stored)
    }

    fn context<'a>(&'a self, id: Option<&'a str>) -> BindContext<'a> {
        BindContext {
            id,
            repository: &*self.repository,
        }
    }

    async fn find_in_scope(&self, route: &RouteDescriptor, locator: &EntityLocator, id: &str) -> Result<Entity, AppError> {
        let entity = self
            .repository
            .find(locator, id)
            .await?
            .ok_or_else(|| not_found(&route.entity_name, id))?;
        check_fetched_scope(route, &entity, &self.model.registry)?;
        Ok(entity)
    }
}

fn target_id(route: &RouteDescriptor) -> Result<&str, AppError> {
    route
        .target_id
        .as_deref()
        .ok_or_else(|| AppError::MethodNotAllowed(format!("{} collection", route.entity_name)))
}

/// Flattened form payload: nested `{"id": ..}` references become bare ids.
fn payload_of(route: &RouteDescriptor, body: &Map<String, Value>) -> Entity {
    if has_nested_references(body) {
        tracing::debug!(entity = %route.entity_name, "flattening nested references");
    }
    flatten(body)
}

fn not_found(entity_name: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} '{}'", entity_name, id))
}
