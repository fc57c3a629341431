use serde::Deserialize;
use validator::Validate;

use super::{not_blank, trimmed, trimmed_opt};

/// Body of `POST /categories/:id/sub-categories`; the owning category comes from the path.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateSubCategory {
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

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateSubCategory {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{check, FieldErrors};
    use serde_json::json;

    #[test]
    fn blank_and_overlong_names_are_rejected() {
        let body: CreateSubCategory =
            serde_json::from_value(json!({ "name": "  ", "description": "Desk lamps" })).unwrap();
        let mut errors = FieldErrors::new();
        check(&body, &mut errors);
        assert_eq!(errors["name"], vec!["name is required"]);
        assert!(!errors.contains_key("description"));

        let put: UpdateSubCategory =
            serde_json::from_value(json!({ "name": "y".repeat(101), "description": " " })).unwrap();
        let mut errors = FieldErrors::new();
        check(&put, &mut errors);
        assert_eq!(errors["name"], vec!["name cannot exceed 100 characters"]);
        assert_eq!(errors["description"], vec!["description cannot be empty"]);
    }
}
