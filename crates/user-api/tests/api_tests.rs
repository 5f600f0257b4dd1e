//! API integration tests
//!
//! The full router runs against the in-memory identity store, so every
//! flow here exercises the real handlers, middleware, and services.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use user_api::auth::{TokenCodec, TokenConfig};
use user_api::testing::{create_router_for_testing, test_state};
use user_core::store::memory::MemoryIdentityStore;

/// Router plus a handle to its backing store
fn test_app() -> (Router, Arc<MemoryIdentityStore>) {
    let (state, store) = test_state();
    (user_api::create_router(state), store)
}

/// Helper to create a JSON request, optionally with a bearer token
fn create_json_request(
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register an account and return a valid bearer token plus the account id
async fn register_and_login(app: &Router, email: &str, password: &str) -> (String, i64) {
    let response = app
        .clone()
        .oneshot(create_json_request(
            "POST",
            "/api/v1/register",
            Some(json!({ "email": email, "password": password })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(create_json_request(
            "POST",
            "/api/v1/login",
            Some(json!({ "email": email, "password": password })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let token = body["token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(create_json_request(
            "GET",
            &format!("/api/private/user/validate?token={token}"),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let account_id = body["account_id"].as_i64().unwrap();

    (token, account_id)
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

// =============================================================================
// Registration Tests
// =============================================================================

#[tokio::test]
async fn test_register_success_is_empty_bodied() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(create_json_request(
            "POST",
            "/api/v1/register",
            Some(json!({ "email": "new@example.com", "password": "hunter2!" })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let (app, _store) = test_app();

    let request = || {
        create_json_request(
            "POST",
            "/api/v1/register",
            Some(json!({ "email": "dup@example.com", "password": "pw" })),
            None,
        )
    };

    let first = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = json_body(second).await;
    assert_eq!(body["code"], "ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(create_json_request(
            "POST",
            "/api/v1/register",
            Some(json!({ "email": "not-an-email", "password": "pw" })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Login Tests
// =============================================================================

#[tokio::test]
async fn test_login_returns_token_and_expiry() {
    let (app, _store) = test_app();
    let (_token, _id) = register_and_login(&app, "ada@example.com", "hunter2!").await;

    let response = app
        .clone()
        .oneshot(create_json_request(
            "POST",
            "/api/v1/login",
            Some(json!({ "email": "ada@example.com", "password": "hunter2!" })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["token"].is_string());

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    assert!(body["expires_at"].as_i64().unwrap() > now);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (app, _store) = test_app();
    register_and_login(&app, "real@x.com", "correct-password").await;

    let unknown = app
        .clone()
        .oneshot(create_json_request(
            "POST",
            "/api/v1/login",
            Some(json!({ "email": "nouser@x.com", "password": "anything" })),
            None,
        ))
        .await
        .unwrap();

    let wrong = app
        .clone()
        .oneshot(create_json_request(
            "POST",
            "/api/v1/login",
            Some(json!({ "email": "real@x.com", "password": "wrongpassword" })),
            None,
        ))
        .await
        .unwrap();

    // Identical status and identical body for the two failure causes
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);

    let unknown_body = json_body(unknown).await;
    let wrong_body = json_body(wrong).await;
    assert_eq!(unknown_body, wrong_body);
    assert_eq!(unknown_body["code"], "INVALID_CREDENTIALS");
}

// =============================================================================
// Session Gate Tests
// =============================================================================

#[tokio::test]
async fn test_protected_route_without_header() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(create_json_request("GET", "/api/v1/user", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_protected_route_with_garbage_token() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(create_json_request(
            "GET",
            "/api/v1/user",
            None,
            Some("garbage"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_expired_token() {
    let (app, _store) = test_app();
    let (_token, account_id) = register_and_login(&app, "ada@example.com", "pw").await;

    // Well-formed, correctly signed, already expired
    let expired_codec = TokenCodec::new(TokenConfig {
        secret: "test-secret".to_string(),
        ttl_secs: 0,
    });
    let expired = expired_codec.issue(account_id, "ada@example.com").unwrap();

    let response = app
        .clone()
        .oneshot(create_json_request(
            "GET",
            "/api/v1/user",
            None,
            Some(&expired.token),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_wrong_algorithm_token() {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use user_api::auth::Claims;

    let (app, _store) = test_app();
    let (_token, account_id) = register_and_login(&app, "ada@example.com", "pw").await;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let claims = Claims {
        sub: account_id,
        email: "ada@example.com".to_string(),
        iat: now,
        exp: now + 3600,
    };
    // Valid signature under the shared secret, but the wrong algorithm
    let forged = encode(
        &Header::new(Algorithm::HS384),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap();

    let response = app
        .clone()
        .oneshot(create_json_request("GET", "/api/v1/user", None, Some(&forged)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let (app, _store) = test_app();
    let (token, account_id) = register_and_login(&app, "ada@example.com", "pw").await;

    let response = app
        .clone()
        .oneshot(create_json_request("GET", "/api/v1/user", None, Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"].as_i64().unwrap(), account_id);
    assert_eq!(body["email"], "ada@example.com");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_gate_rejects_token_for_removed_account() {
    let (app, store) = test_app();
    let (token, account_id) = register_and_login(&app, "gone@example.com", "pw").await;

    assert!(store.remove_account(account_id));

    let response = app
        .clone()
        .oneshot(create_json_request("GET", "/api/v1/user", None, Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Token Introspection Tests
// =============================================================================

#[tokio::test]
async fn test_validate_token_success() {
    let (app, _store) = test_app();
    let (token, account_id) = register_and_login(&app, "ada@example.com", "pw").await;

    let response = app
        .clone()
        .oneshot(create_json_request(
            "GET",
            &format!("/api/private/user/validate?token={token}"),
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["is_valid"], true);
    assert_eq!(body["account_id"].as_i64().unwrap(), account_id);
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn test_validate_token_rejects_garbage() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(create_json_request(
            "GET",
            "/api/private/user/validate?token=garbage",
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validate_token_for_removed_account() {
    let (app, store) = test_app();
    let (token, account_id) = register_and_login(&app, "gone@example.com", "pw").await;

    assert!(store.remove_account(account_id));

    let response = app
        .clone()
        .oneshot(create_json_request(
            "GET",
            &format!("/api/private/user/validate?token={token}"),
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

// =============================================================================
// Profile Tests
// =============================================================================

#[tokio::test]
async fn test_profile_create_requires_auth() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(create_json_request(
            "POST",
            "/api/v1/profile",
            Some(json!({ "first_name": "Ada" })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_lifecycle() {
    let (app, _store) = test_app();
    let (token, account_id) = register_and_login(&app, "ada@example.com", "pw").await;

    // No profile yet
    let response = app
        .clone()
        .oneshot(create_json_request("GET", "/api/v1/profile", None, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Create
    let response = app
        .clone()
        .oneshot(create_json_request(
            "POST",
            "/api/v1/profile",
            Some(json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "city": "London",
                "country": "UK",
                "region": "Europe",
                "personal_id": "X1234",
                "personal_id_type": "Passport"
            })),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Read back
    let response = app
        .clone()
        .oneshot(create_json_request("GET", "/api/v1/profile", None, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["account_id"].as_i64().unwrap(), account_id);
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(body["city"], "London");

    // Update
    let response = app
        .clone()
        .oneshot(create_json_request(
            "PUT",
            "/api/v1/profile",
            Some(json!({ "first_name": "Ada", "city": "Cambridge" })),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Private out-of-band lookup sees the update
    let response = app
        .clone()
        .oneshot(create_json_request(
            "GET",
            &format!("/api/private/user/profile?account_id={account_id}"),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["city"], "Cambridge");
}

#[tokio::test]
async fn test_private_profile_lookup_absent() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(create_json_request(
            "GET",
            "/api/private/user/profile?account_id=404",
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Account Update Tests
// =============================================================================

#[tokio::test]
async fn test_update_email_keeps_credential() {
    let (app, _store) = test_app();
    let (token, _id) = register_and_login(&app, "old@example.com", "hunter2!").await;

    let response = app
        .clone()
        .oneshot(create_json_request(
            "PUT",
            "/api/v1/user",
            Some(json!({ "email": "new@example.com" })),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The same password logs in under the new email
    let response = app
        .clone()
        .oneshot(create_json_request(
            "POST",
            "/api/v1/login",
            Some(json!({ "email": "new@example.com", "password": "hunter2!" })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
