//! Request extractors.

pub mod body;
pub mod route;
pub use body::{ObjectBody, PatchBody};
pub use route::ResolvedRoute;
