//! Route builders.

mod common;
mod resource;
pub use common::common_routes;
pub use resource::{mounted_resource_routes, resource_routes};
