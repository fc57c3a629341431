use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET / - service description
pub async fn root() -> ApiResult<serde_json::Value> {
    Ok(ApiResponse::ok(
        "Catalog API",
        json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/auth/login, /auth/logout, /me",
                "categories": "/categories[/:id], /categories/:id/sub-categories",
                "subCategories": "/sub-categories[/:id]",
                "products": "/products[/:id]",
                "admin": "/admin/products[/:id] (authenticated)",
                "dashboard": "/dashboard",
            }
        }),
    ))
}

/// GET /health - 503 while the database is unreachable
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "ok",
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "message": "database unavailable",
                "data": { "status": "degraded", "timestamp": now, "databaseError": e.to_string() }
            })),
        ),
    }
}
