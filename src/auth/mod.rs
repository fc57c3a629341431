use chrono::{Duration, Utc};
use cookie::time::Duration as CookieDuration;
use cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::database::models::User;

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub uid: i32,
    pub name: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            uid: user.id,
            name: user.username.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("Failed to issue token: {0}")]
    TokenIssue(#[source] jsonwebtoken::errors::Error),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(AuthError::TokenIssue)
}

/// Check signature and expiry, returning the embedded claims.
pub fn verify_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(AuthError::InvalidToken)
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// A malformed stored hash counts as a mismatch rather than a server error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Session cookie carrying a freshly issued token.
pub fn session_cookie(token: &str, security: &SecurityConfig) -> Cookie<'static> {
    let max_age = CookieDuration::hours(security.jwt_expiry_hours as i64);
    token_cookie(token.to_owned(), max_age, security)
}

/// Expired, empty session cookie; clears the browser's copy.
pub fn cleared_cookie(security: &SecurityConfig) -> Cookie<'static> {
    token_cookie(String::new(), CookieDuration::ZERO, security)
}

fn token_cookie(value: String, max_age: CookieDuration, security: &SecurityConfig) -> Cookie<'static> {
    let mut cookie = Cookie::new(TOKEN_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(max_age);
    cookie.set_secure(security.secure_cookies);
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn user() -> User {
        User {
            id: 7,
            username: "Ana".into(),
            email: "ana@example.com".into(),
            password: String::new(),
            role: "admin".into(),
        }
    }

    #[test]
    fn token_round_trips_claims() {
        let security = AppConfig::for_tests().security;
        let claims = Claims::new(&user(), 1);
        let token = generate_jwt(&claims, &security).unwrap();
        assert_eq!(verify_jwt(&token, &security).unwrap(), claims);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let security = AppConfig::for_tests().security;
        let mut other = security.clone();
        other.jwt_secret = "someone-else".into();

        let token = generate_jwt(&Claims::new(&user(), 1), &other).unwrap();
        assert!(matches!(
            verify_jwt(&token, &security),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let security = AppConfig::for_tests().security;
        let mut claims = Claims::new(&user(), 1);
        claims.iat -= 7200;
        claims.exp -= 7200;
        let token = generate_jwt(&claims, &security).unwrap();
        assert!(verify_jwt(&token, &security).is_err());
    }

    #[test]
    fn bcrypt_hash_verifies() {
        let hash = bcrypt::hash("hunter2", 4).unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-hash"));
    }

    #[test]
    fn cookie_flags_follow_config() {
        let mut security = AppConfig::for_tests().security;
        security.jwt_expiry_hours = 1;
        let cookie = session_cookie("abc", &security);
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::hours(1)));

        let header = cookie.to_string();
        assert!(header.starts_with("token=abc;"));
        assert!(header.contains("Max-Age=3600"));
        assert!(!header.contains("Secure"));

        security.secure_cookies = true;
        let cleared = cleared_cookie(&security);
        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.max_age(), Some(CookieDuration::ZERO));
        assert!(cleared.to_string().contains("Secure"));
    }
}
