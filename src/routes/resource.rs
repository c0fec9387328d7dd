//! Resource routes: one wildcard route, classified per request.

use crate::handlers::resource::{delete, patch, read, save};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

/// Wildcard resource routes. Paths are classified from the full request URI, so the
/// router works at the root or nested under the configured prefix.
pub fn resource_routes(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route(
            "/*path",
            get(read).post(save).put(save).patch(patch).delete(delete),
        )
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .with_state(state)
}

/// Resource routes mounted at the model's prefix, e.g. `/api`.
pub fn mounted_resource_routes(state: AppState, body_limit_bytes: usize) -> Router {
    let mount = state.model.route.mount_path();
    let routes = resource_routes(state, body_limit_bytes);
    if mount == "/" {
        routes
    } else {
        Router::new().nest(&mount, routes)
    }
}
