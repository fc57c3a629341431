use serde::Deserialize;
use validator::Validate;

use super::{not_blank, trimmed, trimmed_opt};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateCategory {
    #[serde(deserialize_with = "trimmed")]
    #[validate(
        custom(function = "not_blank", message = "name is required"),
        length(max = 100, message = "name cannot exceed 100 characters")
    )]
    pub name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
}

/// PATCH body: every field optional, present fields must be non-blank.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateCategory {
    #[serde(deserialize_with = "trimmed_opt")]
    #[validate(
        custom(function = "not_blank", message = "name cannot be empty"),
        length(max = 100, message = "name cannot exceed 100 characters")
    )]
    pub name: Option<String>,
    #[serde(deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "description cannot be empty"))]
    pub description: Option<String>,
}
