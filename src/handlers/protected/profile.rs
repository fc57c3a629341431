use axum::Extension;

use crate::auth::Claims;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /me - claims of the current session
pub async fn me(Extension(AuthUser(claims)): Extension<AuthUser>) -> ApiResult<Claims> {
    Ok(ApiResponse::ok("Authenticated", claims))
}
