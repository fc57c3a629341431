//! Request bodies and their validation rules.

pub mod category;
pub mod product;
pub mod sub_category;
pub mod auth;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::ApiError;

/// Field name -> human readable messages, as returned in the `errors` envelope member.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, list) in errors.field_errors() {
        let messages = list.iter().map(|e| match &e.message {
            Some(message) => message.to_string(),
            None => format!("{} is invalid ({})", field, e.code),
        });
        out.entry(field.to_string()).or_default().extend(messages);
    }
    out
}

pub fn push_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    let message = message.into();
    let messages = errors.entry(field.to_string()).or_default();
    if !messages.contains(&message) {
        messages.push(message);
    }
}

/// Run `Validate` and fold the result into `FieldErrors`.
pub fn check<T: Validate>(value: &T, errors: &mut FieldErrors) {
    if let Err(e) = value.validate() {
        for (field, messages) in field_errors(&e) {
            for message in messages {
                push_error(errors, &field, message);
            }
        }
    }
}

/// JSON body that has been deserialized and validated; failures become a 400 envelope.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        let parsed: T = serde_json::from_value(value)
            .map_err(|e| ApiError::validation_error(format!("Validation failed: {}", e), None))?;

        let mut errors = FieldErrors::new();
        check(&parsed, &mut errors);
        if !errors.is_empty() {
            return Err(ApiError::validation_error("Validation failed", Some(errors)));
        }

        Ok(ValidatedJson(parsed))
    }
}

/// Deserialize a string with surrounding whitespace removed, so length rules see what is stored.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

pub fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(|s| s.trim().to_string()))
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Path ids are positive integers; anything else is rejected before touching the store.
pub fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok().filter(|id| *id > 0)
}
