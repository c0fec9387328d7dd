//! Form binding collaborator contract.

use crate::entity::Entity;
use crate::error::AppError;
use crate::service::PersistenceRepository;
use async_trait::async_trait;

/// How missing fields are treated on submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitMode {
    /// New entity: missing fields keep the entity's defaults.
    Create,
    /// Full update: missing fields are cleared to null.
    Replace,
    /// Every form field except `field` is removed before binding.
    Patch { field: String },
}

/// Options the form is built with.
#[derive(Clone, Copy)]
pub struct BindContext<'a> {
    /// Id of the entity being updated, absent on create.
    pub id: Option<&'a str>,
    /// Store used to resolve relation ids.
    pub repository: &'a dyn PersistenceRepository,
}

pub struct BindRequest<'a> {
    /// Form name, e.g. `OrderItemType`.
    pub form: &'a str,
    /// Candidate instance the payload is bound onto.
    pub entity: Entity,
    /// Flattened payload.
    pub payload: &'a Entity,
    pub mode: SubmitMode,
    pub context: BindContext<'a>,
}

#[async_trait]
pub trait FormBinder: Send + Sync {
    /// Bind and validate. Invalid input fails with `AppError::ValidationFailed`.
    async fn bind(&self, request: BindRequest<'_>) -> Result<Entity, AppError>;
}
