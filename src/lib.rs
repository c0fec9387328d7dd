//! Resource SDK: generic REST resource resolution and CRUD over a configured entity model.

pub mod body;
pub mod case;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod extractors;
pub mod guard;
pub mod handlers;
pub mod registry;
pub mod resolver;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{load_from_file, parse_config, resolve, ResolvedModel, ResourceConfig, Settings};
pub use entity::{Entity, EntityLocator};
pub use error::{AppError, ConfigError};
pub use events::{BroadcastEventSink, EventSink, FanoutEventSink, LifecycleEvent, TracingEventSink};
pub use registry::{EntityRegistry, EntityType};
pub use resolver::{resolve_path, RouteDescriptor, RouteScheme};
pub use response::{success_one, success_one_ok, success_page};
pub use routes::{common_routes, mounted_resource_routes, resource_routes};
pub use service::{CrudService, FormBinder, PersistenceRepository};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_resource_tables, MemoryRepository, PgRepository};
