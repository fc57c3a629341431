use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::require_auth;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(public::home::root))
        .route("/health", get(public::home::health))
        .route("/dashboard", get(public::dashboard::summary))
        .merge(auth_routes())
        .merge(category_routes())
        .merge(product_routes())
        // Session-gated
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use public::session;

    Router::new()
        .route("/auth/login", post(session::login))
        .route("/auth/logout", post(session::logout))
}

fn category_routes() -> Router<AppState> {
    use public::{categories, sub_categories};

    Router::new()
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/:id",
            get(categories::show)
                .patch(categories::update)
                .delete(categories::delete),
        )
        .route("/categories/:id/sub-categories", post(sub_categories::create))
        .route(
            "/categories/:category_id/sub-categories/:sub_category_id",
            put(sub_categories::update),
        )
        .route("/sub-categories", get(sub_categories::list))
        .route(
            "/sub-categories/:id",
            get(sub_categories::show).delete(sub_categories::delete),
        )
}

fn product_routes() -> Router<AppState> {
    use public::products;

    Router::new()
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/:id",
            get(products::show)
                .patch(products::update)
                .delete(products::delete),
        )
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{admin_products, profile};

    Router::new()
        .route("/me", get(profile::me))
        .route("/admin/products", get(admin_products::list))
        .route("/admin/products/:id", get(admin_products::show))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

/// Configured origins with credentials allowed; `*` entries are skipped.
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::auth::{generate_jwt, Claims};
    use crate::config::AppConfig;
    use crate::database::models::User;
    use crate::database::DatabaseManager;
    use crate::testing::RecordingMediaStore;

    const BOUNDARY: &str = "catalog-test-boundary";

    fn test_state() -> AppState {
        let config = AppConfig::for_tests();
        let pool = DatabaseManager::connect_lazy(&config.database).unwrap();
        AppState::new(pool, Arc::new(RecordingMediaStore::new()), config)
    }

    fn token(state: &AppState) -> String {
        let user = User {
            id: 3,
            username: "Ana".into(),
            email: "ana@example.com".into(),
            password: String::new(),
            role: "admin".into(),
        };
        generate_jwt(&Claims::new(&user, 1), &state.config.security).unwrap()
    }

    fn multipart(fields: &[(&str, &str)], files: usize) -> Body {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            ));
        }
        for i in 0..files {
            body.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"imgs\"; filename=\"{}.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nxx\r\n",
                BOUNDARY, i
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        Body::from(body)
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = app(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn me_requires_a_session() {
        let request = Request::get("/me").body(Body::empty()).unwrap();
        let (status, body) = send(test_state(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn me_rejects_tampered_token() {
        let state = test_state();
        let mut token = token(&state);
        token.push('x');

        let request = Request::get("/me")
            .header(header::COOKIE, format!("token={}", token))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(state, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn me_returns_session_claims() {
        let state = test_state();
        let request = Request::get("/me")
            .header(header::COOKIE, format!("theme=dark; token={}", token(&state)))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(state, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["uid"], json!(3));
        assert_eq!(body["data"]["email"], json!("ana@example.com"));
    }

    #[tokio::test]
    async fn admin_listing_requires_a_session() {
        let request = Request::get("/admin/products").body(Body::empty()).unwrap();
        let (status, _) = send(test_state(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn empty_category_body_reports_field_errors() {
        let request = Request::post("/categories")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = send(test_state(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("Validation failed"));
        assert_eq!(body["errors"]["name"][0], json!("name is required"));
        assert!(body["errors"]["description"].is_array());
    }

    #[tokio::test]
    async fn whitespace_only_category_is_rejected() {
        let request = Request::post("/categories")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"   ","description":"  "}"#))
            .unwrap();
        let (status, body) = send(test_state(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["name"][0], json!("name is required"));
        assert_eq!(body["errors"]["description"][0], json!("description is required"));
    }

    #[tokio::test]
    async fn overlong_sub_category_name_is_rejected() {
        let body = json!({ "name": "n".repeat(101), "description": "Desk lamps" }).to_string();
        let request = Request::post("/categories/1/sub-categories")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let (status, body) = send(test_state(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["name"][0], json!("name cannot exceed 100 characters"));
    }

    #[tokio::test]
    async fn non_numeric_ids_are_rejected() {
        let request = Request::get("/categories/abc").body(Body::empty()).unwrap();
        let (status, body) = send(test_state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));

        let request = Request::patch("/products/abc")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(multipart(&[("name", "Lamp")], 0))
            .unwrap();
        let (status, _) = send(test_state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_validates_email_before_lookup() {
        let request = Request::post("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email":"nope","password":"x"}"#))
            .unwrap();
        let (status, body) = send(test_state(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["email"].is_array());
    }

    #[tokio::test]
    async fn too_many_images_are_rejected() {
        let request = Request::post("/products")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(multipart(&[("name", "Lamp")], 11))
            .unwrap();
        let (status, body) = send(test_state(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["imgs"][0], json!("At most 10 images are allowed"));
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let request = Request::post("/auth/logout").body(Body::empty()).unwrap();
        let response = app(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
