//! Resource resolver: request path -> entity type, parent scope and target id.

pub mod classify;
pub mod noun;
pub mod segment;

pub use classify::{classify, ParentScope, RouteDescriptor, RouteScheme};
pub use noun::{normalize, relation_name};
pub use segment::PathSegments;

/// Segment and classify a raw request path in one step.
pub fn resolve_path(scheme: &RouteScheme, path: &str) -> Result<RouteDescriptor, crate::error::AppError> {
    classify(scheme, &PathSegments::parse(path))
}
