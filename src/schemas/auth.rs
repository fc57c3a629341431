use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_malformed_email() {
        let body: LoginRequest =
            serde_json::from_value(json!({ "email": "nope", "password": "x" })).unwrap();
        let errors = body.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
