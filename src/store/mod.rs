//! Persistence implementations: in-memory and PostgreSQL JSONB.

mod memory;
mod postgres;
mod query;

pub use memory::MemoryRepository;
pub use postgres::{ensure_database_exists, ensure_resource_tables, resource_schema, PgRepository};
pub use query::{ListParams, SortKey, MAX_PAGE_SIZE};
