//! Shared application state for all routes.

use crate::config::ResolvedModel;
use crate::events::EventSink;
use crate::service::{CrudService, FormBinder, PersistenceRepository, RuleFormBinder};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ResolvedModel>,
    pub crud: CrudService,
}

impl AppState {
    /// State with the rule-driven form binder.
    pub fn new(
        model: Arc<ResolvedModel>,
        repository: Arc<dyn PersistenceRepository>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let binder = Arc::new(RuleFormBinder::new(model.clone()));
        Self::with_binder(model, repository, binder, events)
    }

    pub fn with_binder(
        model: Arc<ResolvedModel>,
        repository: Arc<dyn PersistenceRepository>,
        binder: Arc<dyn FormBinder>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        AppState {
            crud: CrudService::new(model.clone(), repository, binder, events),
            model,
        }
    }
}
