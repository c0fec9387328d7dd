//! JSON object bodies.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    Json,
};
use serde_json::{Map, Value};

/// Request body that must be a JSON object. Key order is kept as sent.
#[derive(Clone, Debug)]
pub struct ObjectBody(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for ObjectBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        match value {
            Value::Object(map) => Ok(ObjectBody(map)),
            _ => Err(AppError::BadRequest("body must be a JSON object".into())),
        }
    }
}

/// Patch body: like [`ObjectBody`], but an absent body, zero bytes or JSON `null` read as
/// an empty object so the empty-patch check applies.
#[derive(Clone, Debug)]
pub struct PatchBody(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for PatchBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(PatchBody(Map::new()));
        }
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|err| AppError::BadRequest(format!("invalid JSON body: {}", err)))?;
        match value {
            Value::Null => Ok(PatchBody(Map::new())),
            Value::Object(map) => Ok(PatchBody(map)),
            _ => Err(AppError::BadRequest("body must be a JSON object".into())),
        }
    }
}
