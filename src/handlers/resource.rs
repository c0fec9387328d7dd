//! Resource handlers: one per HTTP method, dispatching on the resolved route shape.
//!
//! | method    | single instance | collection    | nested collection |
//! |-----------|-----------------|---------------|-------------------|
//! | GET       | detail          | list          | list_sub          |
//! | POST, PUT | save (update)   | save (create) | save (create)     |
//! | PATCH     | patch           | 405           | 405               |
//! | DELETE    | delete          | 405           | 405               |

use crate::error::AppError;
use crate::extractors::{ObjectBody, PatchBody, ResolvedRoute};
use crate::resolver::RouteDescriptor;
use crate::response::{success_one, success_one_ok, success_page};
use crate::service::{ListQuery, SaveOutcome};
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

fn require_single(route: &RouteDescriptor, method: &str) -> Result<(), AppError> {
    if route.is_collection() {
        return Err(AppError::MethodNotAllowed(format!(
            "{} on {} collection",
            method, route.entity_name
        )));
    }
    Ok(())
}

pub async fn read(
    State(state): State<AppState>,
    ResolvedRoute(route): ResolvedRoute,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    if !route.is_collection() {
        let entity = state.crud.detail(&route).await?;
        return Ok(success_one_ok(entity).into_response());
    }
    let page = if route.is_sub_resource_list {
        state.crud.list_sub(&route, &query).await?
    } else {
        state.crud.list(&route, &query).await?
    };
    Ok(success_page(page).into_response())
}

/// POST and PUT: create on collection routes, full update on single-instance routes.
pub async fn save(
    State(state): State<AppState>,
    ResolvedRoute(route): ResolvedRoute,
    ObjectBody(body): ObjectBody,
) -> Result<Response, AppError> {
    Ok(match state.crud.save(&route, &body).await? {
        SaveOutcome::Created(entity) => success_one(entity).into_response(),
        SaveOutcome::Updated(entity) => success_one_ok(entity).into_response(),
    })
}

pub async fn patch(
    State(state): State<AppState>,
    ResolvedRoute(route): ResolvedRoute,
    PatchBody(body): PatchBody,
) -> Result<Response, AppError> {
    require_single(&route, "PATCH")?;
    let entity = state.crud.patch(&route, &body).await?;
    Ok(success_one_ok(entity).into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    ResolvedRoute(route): ResolvedRoute,
) -> Result<StatusCode, AppError> {
    require_single(&route, "DELETE")?;
    state.crud.delete(&route).await?;
    Ok(StatusCode::NO_CONTENT)
}
