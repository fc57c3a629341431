use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use cookie::Cookie;
use serde_json::json;
use tracing::info;

use crate::auth::{cleared_cookie, generate_jwt, session_cookie, verify_password, AuthError, Claims};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::schemas::auth::LoginRequest;
use crate::schemas::ValidatedJson;
use crate::services::user_service;
use crate::state::AppState;

fn with_cookie(mut response: Response, cookie: Cookie<'static>) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| ApiError::internal_server_error(format!("Invalid cookie: {}", e)))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

/// POST /auth/login - verify credentials and set the `token` cookie
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let user = user_service::find_by_email(&state.pool, &body.email)
        .await?
        .filter(|user| verify_password(&body.password, &user.password))
        .ok_or(AuthError::InvalidCredentials)?;

    let security = &state.config.security;
    let claims = Claims::new(&user, security.jwt_expiry_hours);
    let token = generate_jwt(&claims, security)?;
    info!(user_id = user.id, "User logged in");

    let response = ApiResponse::ok(
        "Login successful",
        json!({ "uid": user.id, "name": user.username, "email": user.email }),
    )
    .into_response();
    with_cookie(response, session_cookie(&token, security))
}

/// POST /auth/logout - clear the cookie
pub async fn logout(State(state): State<AppState>) -> Result<Response, ApiError> {
    let response = ApiResponse::message("Logged out").into_response();
    with_cookie(response, cleared_cookie(&state.config.security))
}
