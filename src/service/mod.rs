//! CrudService and the collaborator contracts it is built on.

mod crud;
mod form;
mod repository;
mod validation;

pub use crud::{CrudService, SaveOutcome};
pub use form::{BindContext, BindRequest, FormBinder, SubmitMode};
pub use repository::{ListQuery, Page, PersistenceRepository, ScopeConstraint};
pub use validation::RuleFormBinder;
