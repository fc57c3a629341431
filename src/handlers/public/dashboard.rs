use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::dashboard_service::{self, DashboardCounts};
use crate::state::AppState;

/// GET /dashboard - all-zero counts are flagged rather than treated as an error
pub async fn summary(State(state): State<AppState>) -> ApiResult<DashboardCounts> {
    let counts = dashboard_service::counts(&state.pool).await?;
    Ok(summary_response(counts))
}

fn summary_response(counts: DashboardCounts) -> ApiResponse<DashboardCounts> {
    if counts.is_empty() {
        ApiResponse::flagged("No data found", counts)
    } else {
        ApiResponse::ok("Dashboard data retrieved", counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::{json, Value};

    async fn render(counts: DashboardCounts) -> (StatusCode, Value) {
        let response = summary_response(counts).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn empty_catalog_is_flagged_with_200() {
        let (status, body) = render(DashboardCounts {
            categories: 0,
            sub_categories: 0,
            products: 0,
        })
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("No data found"));
        assert_eq!(body["data"]["subCategories"], json!(0));
    }

    #[tokio::test]
    async fn any_count_makes_a_normal_summary() {
        let (status, body) = render(DashboardCounts {
            categories: 2,
            sub_categories: 0,
            products: 0,
        })
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["categories"], json!(2));
    }
}
