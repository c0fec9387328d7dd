//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field-keyed validation messages. Errors on the form itself use [`FORM_ERROR_KEY`].
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const FORM_ERROR_KEY: &str = "_form";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("duplicate entity name: {0}")]
    DuplicateEntity(String),
    #[error("duplicate field: {entity}.{field}")]
    DuplicateField { entity: String, field: String },
    #[error("invalid entity name '{0}' (expected PascalCase letters)")]
    InvalidEntityName(String),
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("malformed route: {0}")]
    MalformedRoute(String),
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),
    #[error("unknown form: {0}")]
    UnknownForm(String),
    #[error("request body does not reference parent {relation} '{parent_id}'")]
    ForbiddenRelation { relation: String, parent_id: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not found in scope of {parent} '{parent_id}'")]
    NotFoundInScope { parent: String, parent_id: String },
    #[error("validation failed")]
    ValidationFailed(FieldErrors),
    #[error("at least one field required")]
    EmptyPatch,
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        self.status_and_code().0
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::MalformedRoute(_) => (StatusCode::NOT_FOUND, "malformed_route"),
            AppError::UnknownEntityType(_) => (StatusCode::NOT_FOUND, "unknown_entity_type"),
            AppError::UnknownForm(_) => (StatusCode::INTERNAL_SERVER_ERROR, "unknown_form"),
            AppError::ForbiddenRelation { .. } => (StatusCode::FORBIDDEN, "forbidden_relation"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            // Scope mismatches look exactly like missing rows.
            AppError::NotFoundInScope { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::ValidationFailed(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::EmptyPatch => (StatusCode::BAD_REQUEST, "empty_patch"),
            AppError::MethodNotAllowed(_) => (StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let (message, details) = match self {
            AppError::ValidationFailed(errors) => (
                "validation failed".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            AppError::NotFoundInScope { .. } => ("not found".to_string(), None),
            other => (other.to_string(), None),
        };
        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::EmptyPatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::ForbiddenRelation {
                relation: "order".into(),
                parent_id: "5".into()
            }
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFoundInScope {
                parent: "Order".into(),
                parent_id: "5".into()
            }
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ValidationFailed(FieldErrors::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UnknownEntityType("Widget".into()).status(),
            StatusCode::NOT_FOUND
        );
    }
}
