//! Rule-driven form binding: coerce submitted values by field kind, then validate config rules.

use crate::config::{FieldKind, FieldSpec, FormSpec, ResolvedModel, ValidationRule};
use crate::entity::{id_string, Entity, ID_KEY};
use crate::error::{AppError, FieldErrors, FORM_ERROR_KEY};
use crate::service::{BindContext, BindRequest, FormBinder, SubmitMode};
use async_trait::async_trait;
use serde_json::{Map, Number, Value};
use std::sync::Arc;

const BLANK: &str = "This value should not be blank.";
const INVALID: &str = "This value is not valid.";
const EXTRA_FIELDS: &str = "This form should not contain extra fields.";

/// Binds payloads onto entities using the forms of a resolved model.
pub struct RuleFormBinder {
    model: Arc<ResolvedModel>,
}

impl RuleFormBinder {
    pub fn new(model: Arc<ResolvedModel>) -> Self {
        RuleFormBinder { model }
    }
}

#[async_trait]
impl FormBinder for RuleFormBinder {
    async fn bind(&self, request: BindRequest<'_>) -> Result<Entity, AppError> {
        let BindRequest {
            form,
            mut entity,
            payload,
            mode,
            context,
        } = request;
        let mut form: FormSpec = self.model.form(form)?.clone();
        if let SubmitMode::Patch { field } = &mode {
            form.retain_only(field);
            if form.field(field).is_none() {
                let mut errors = FieldErrors::new();
                push(&mut errors, FORM_ERROR_KEY, EXTRA_FIELDS);
                return Err(AppError::ValidationFailed(errors));
            }
        }
        tracing::debug!(form = %form.name, id = ?context.id, mode = ?mode, "binding form");

        let mut errors = FieldErrors::new();
        if !matches!(mode, SubmitMode::Patch { .. }) {
            if payload.keys().any(|k| k != ID_KEY && form.field(k).is_none()) {
                push(&mut errors, FORM_ERROR_KEY, EXTRA_FIELDS);
            }
        }

        for field in &form.fields {
            match payload.get(&field.name) {
                Some(submitted) => match self.coerce(field, submitted, context).await {
                    Ok(value) => {
                        let messages = validate_field(field, &value);
                        if messages.is_empty() {
                            entity.insert(field.name.clone(), value);
                        } else {
                            errors.entry(field.name.clone()).or_default().extend(messages);
                        }
                    }
                    Err(message) => push(&mut errors, &field.name, message),
                },
                None => {
                    if mode == SubmitMode::Replace {
                        entity.insert(field.name.clone(), Value::Null);
                    }
                    let current = entity.get(&field.name).unwrap_or(&Value::Null);
                    if is_required(&field.rules) && current.is_null() {
                        push(&mut errors, &field.name, BLANK);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(entity)
        } else {
            Err(AppError::ValidationFailed(errors))
        }
    }
}

impl RuleFormBinder {
    /// Normalize a submitted value to the field's kind. Relations must point at stored entities.
    async fn coerce(
        &self,
        field: &FieldSpec,
        submitted: &Value,
        context: BindContext<'_>,
    ) -> Result<Value, &'static str> {
        if submitted.is_null() {
            return Ok(Value::Null);
        }
        match &field.kind {
            FieldKind::Json => Ok(submitted.clone()),
            FieldKind::String => match submitted {
                Value::String(_) => Ok(submitted.clone()),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                _ => Err(INVALID),
            },
            FieldKind::Integer => match submitted {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(submitted.clone()),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(|n| Value::Number(n.into()))
                    .map_err(|_| INVALID),
                _ => Err(INVALID),
            },
            FieldKind::Number => match submitted {
                Value::Number(_) => Ok(submitted.clone()),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or(INVALID),
                _ => Err(INVALID),
            },
            FieldKind::Boolean => match submitted {
                Value::Bool(_) => Ok(submitted.clone()),
                Value::String(s) if s == "1" || s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
                Value::String(s) if s == "0" || s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
                Value::Number(n) if n.as_i64() == Some(1) => Ok(Value::Bool(true)),
                Value::Number(n) if n.as_i64() == Some(0) => Ok(Value::Bool(false)),
                _ => Err(INVALID),
            },
            FieldKind::Relation(target) => self.reference(target, submitted, context).await,
            FieldKind::Relations(target) => {
                let ids: Vec<&Value> = match submitted {
                    Value::Array(items) => items.iter().collect(),
                    Value::Object(map) => map.values().collect(),
                    _ => return Err(INVALID),
                };
                let mut refs = Vec::with_capacity(ids.len());
                for id in ids {
                    refs.push(self.reference(target, id, context).await?);
                }
                Ok(Value::Array(refs))
            }
        }
    }

    /// `{"id": <stored id>}` for an existing entity of `target`.
    async fn reference(
        &self,
        target: &str,
        submitted: &Value,
        context: BindContext<'_>,
    ) -> Result<Value, &'static str> {
        let id = id_string(submitted).ok_or(INVALID)?;
        let locator = &self.model.entity(target).map_err(|_| INVALID)?.locator;
        let found = context
            .repository
            .find(locator, &id)
            .await
            .map_err(|err| {
                tracing::warn!(entity = %target, id = %id, error = %err, "relation lookup failed");
                INVALID
            })?
            .ok_or(INVALID)?;
        let mut reference = Map::new();
        reference.insert(
            ID_KEY.to_string(),
            found.get(ID_KEY).cloned().unwrap_or(Value::String(id)),
        );
        Ok(Value::Object(reference))
    }
}

fn push(errors: &mut FieldErrors, key: &str, message: &str) {
    errors.entry(key.to_string()).or_default().push(message.to_string());
}

fn is_required(rule: &ValidationRule) -> bool {
    rule.required == Some(true)
}

/// All rule violations for one bound value.
fn validate_field(field: &FieldSpec, v: &Value) -> Vec<String> {
    let rule = &field.rules;
    let mut messages = Vec::new();
    if v.is_null() {
        if is_required(rule) {
            messages.push(BLANK.to_string());
        }
        return messages;
    }
    if let Some(format) = &rule.format {
        if let Some(m) = validate_format(v, format) {
            messages.push(m);
        }
    }
    if let Some(s) = v.as_str() {
        let len = s.chars().count();
        if let Some(max) = rule.max_length {
            if len > max as usize {
                messages.push(format!("This value is too long. It should have {} characters or less.", max));
            }
        }
        if let Some(min) = rule.min_length {
            if len < min as usize {
                messages.push(format!("This value is too short. It should have {} characters or more.", min));
            }
        }
        if let Some(re) = &field.pattern {
            if !re.is_match(s) {
                messages.push("This value does not match the required pattern.".to_string());
            }
        }
    }
    if let Some(ref allowed) = rule.allowed {
        if !allowed.iter().any(|a| value_eq(v, a)) {
            messages.push("The value you selected is not a valid choice.".to_string());
        }
    }
    if let Some(n) = v.as_f64() {
        if let Some(min) = rule.minimum {
            if n < min {
                messages.push(format!("This value should be {} or more.", min));
            }
        }
        if let Some(max) = rule.maximum {
            if n > max {
                messages.push(format!("This value should be {} or less.", max));
            }
        }
    }
    messages
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(s), Value::String(t)) => s == t,
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn validate_format(v: &Value, format: &str) -> Option<String> {
    let s = v.as_str()?;
    match format.to_lowercase().as_str() {
        "email" => {
            let valid = s
                .split_once('@')
                .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
                .unwrap_or(false);
            (!valid).then(|| "This value is not a valid email address.".to_string())
        }
        "uuid" => uuid::Uuid::parse_str(s)
            .is_err()
            .then(|| "This is not a valid UUID.".to_string()),
        _ => None,
    }
}
