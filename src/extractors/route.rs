//! Resolve the full request path into a route descriptor.

use crate::error::AppError;
use crate::resolver::{resolve_path, RouteDescriptor};
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
};

/// Route descriptor of the current request. Uses the original URI so the router can be
/// nested under the configured prefix.
#[derive(Clone, Debug)]
pub struct ResolvedRoute(pub RouteDescriptor);

#[async_trait]
impl FromRequestParts<AppState> for ResolvedRoute {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let path = match parts.extensions.get::<OriginalUri>() {
            Some(OriginalUri(uri)) => uri.path().to_string(),
            None => parts.uri.path().to_string(),
        };
        resolve_path(&state.model.route, &path).map(ResolvedRoute)
    }
}
