use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use cookie::Cookie;

use crate::auth::{verify_jwt, AuthError, Claims, TOKEN_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from the session token
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser(pub Claims);

/// Rejects requests without a valid session token and injects `AuthUser` otherwise.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers).ok_or(AuthError::MissingToken)?;
    let claims = verify_jwt(&token, &state.config.security)?;

    request.extensions_mut().insert(AuthUser(claims));
    Ok(next.run(request).await)
}

/// The `token` cookie wins over an `Authorization: Bearer` header.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| Cookie::parse(pair).ok())
        .find(|cookie| cookie.name() == TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
}
