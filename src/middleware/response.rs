use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Success envelope: `{ success, message, data? }`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with data
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(message, Some(data), StatusCode::OK)
    }

    /// 201 with data
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(message, Some(data), StatusCode::CREATED)
    }

    pub fn with_status(message: impl Into<String>, data: Option<T>, status_code: StatusCode) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            status_code,
        }
    }

    /// 200 answered with `success: false`, for empty-but-valid results.
    pub fn flagged(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            ..Self::ok(message, data)
        }
    }
}

impl ApiResponse<()> {
    /// 200 without a `data` member
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_status(message, None, StatusCode::OK)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = json!({
            "success": self.success,
            "message": self.message,
        });

        if let Some(data) = &self.data {
            match serde_json::to_value(data) {
                Ok(value) => envelope["data"] = value,
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "success": false,
                            "message": "Failed to serialize response data"
                        })),
                    )
                        .into_response();
                }
            }
        }

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn created_wraps_data() {
        let response = ApiResponse::created("Category created", json!({"id": 1})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("Category created"));
        assert_eq!(body["data"]["id"], json!(1));
    }

    #[tokio::test]
    async fn message_only_omits_data() {
        let body = body_json(ApiResponse::message("Logged out").into_response()).await;
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn flagged_keeps_200_with_success_false() {
        let response = ApiResponse::flagged("No data found", json!({"products": 0})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], json!(false));
    }
}
