//! Authentication API integration tests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

mod common;
use common::{
    create_test_state, get_with_token, post_json, seed_account, seed_disabled_account, token_for,
};
use account_service::{models::account::Role, repository::AccountDirectory, routes};

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_register_success() {
    let (state, _directory) = create_test_state();
    let app = routes::create_router(state.clone());

    let response = app
        .oneshot(post_json(
            "/api/auth/register",
            json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "Password123",
                "firstName": "Alice",
                "lastName": "Liddell"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "User registered successfully");
    assert_eq!(json["user"]["username"], "alice");
    assert_eq!(json["user"]["firstName"], "Alice");
    assert_eq!(json["user"]["role"], "student");
    assert!(json["user"].get("passwordHash").is_none());

    // The issued token names the created account
    let token = json["token"].as_str().unwrap();
    let account_id = state.jwt_service.verify(token).unwrap();
    let user_id: Uuid = json["user"]["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(account_id, user_id);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let (state, directory) = create_test_state();
    seed_account(&directory, "alice", "alice@example.com", "Password123", Role::Student).await;
    let app = routes::create_router(state);

    let response = app
        .oneshot(post_json(
            "/api/auth/register",
            json!({
                "username": "alice",
                "email": "other@example.com",
                "password": "Password123",
                "firstName": "Other",
                "lastName": "Person"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Username already exists");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (state, directory) = create_test_state();
    seed_account(&directory, "alice", "alice@example.com", "Password123", Role::Student).await;
    let app = routes::create_router(state);

    let response = app
        .oneshot(post_json(
            "/api/auth/register",
            json!({
                "username": "someone_else",
                "email": "alice@example.com",
                "password": "Password123",
                "firstName": "Other",
                "lastName": "Person"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Email already exists");
}

#[tokio::test]
async fn test_register_rejects_invalid_fields() {
    let (state, _directory) = create_test_state();
    let app = routes::create_router(state);

    let response = app
        .oneshot(post_json(
            "/api/auth/register",
            json!({
                "username": "al",
                "email": "not-an-email",
                "password": "short",
                "firstName": "",
                "lastName": ""
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_register_short_password() {
    let (state, _directory) = create_test_state();
    let app = routes::create_router(state);

    let response = app
        .oneshot(post_json(
            "/api/auth/register",
            json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "short",
                "firstName": "Bob",
                "lastName": "Builder"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Password must be at least 8 characters");
}

#[tokio::test]
async fn test_login_success_with_username() {
    let (state, directory) = create_test_state();
    seed_account(&directory, "alice", "alice@example.com", "Password123", Role::Student).await;
    let app = routes::create_router(state.clone());

    let response = app
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "username": "alice", "password": "Password123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Login successful");
    assert_eq!(json["user"]["username"], "alice");
    assert!(state.jwt_service.verify(json["token"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_login_success_with_email() {
    let (state, directory) = create_test_state();
    seed_account(&directory, "alice", "alice@example.com", "Password123", Role::Student).await;
    let app = routes::create_router(state);

    let response = app
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "username": "alice@example.com", "password": "Password123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["username"], "alice");
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_user_are_identical() {
    let (state, directory) = create_test_state();
    seed_account(&directory, "alice", "alice@example.com", "Password123", Role::Student).await;
    let app = routes::create_router(state);

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "username": "alice", "password": "WrongPassword1" }),
        ))
        .await
        .unwrap();

    let unknown_user = app
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "username": "nobody", "password": "Password123" }),
        ))
        .await
        .unwrap();

    // Same status and same body, so the two cases cannot be told apart
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let wrong_json = body_json(wrong_password).await;
    let unknown_json = body_json(unknown_user).await;
    assert_eq!(wrong_json, unknown_json);
    assert_eq!(wrong_json["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_missing_fields() {
    let (state, _directory) = create_test_state();
    let app = routes::create_router(state);

    let response = app
        .oneshot(post_json("/api/auth/login", json!({ "username": "alice" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Please provide username and password");
}

#[tokio::test]
async fn test_malformed_body_gets_enveloped_error() {
    let (state, _directory) = create_test_state();
    let app = routes::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not valid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Invalid JSON in request body");
}

#[tokio::test]
async fn test_login_disabled_account() {
    let (state, directory) = create_test_state();
    seed_disabled_account(&directory, "ghost", "ghost@example.com", "Password123").await;
    let app = routes::create_router(state);

    let response = app
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "username": "ghost", "password": "Password123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Account is disabled");
}

#[tokio::test]
async fn test_disabled_account_with_wrong_password_gets_credentials_error() {
    let (state, directory) = create_test_state();
    seed_disabled_account(&directory, "ghost", "ghost@example.com", "Password123").await;
    let app = routes::create_router(state);

    // The password check comes first, so a probe with a bad password does
    // not learn that the account is disabled
    let response = app
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "username": "ghost", "password": "WrongPassword1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_get_current_user() {
    let (state, directory) = create_test_state();
    let account =
        seed_account(&directory, "alice", "alice@example.com", "Password123", Role::Student).await;
    let app = routes::create_router(state.clone());

    let token = token_for(&state, &account.id);

    let response = app
        .oneshot(get_with_token("/api/auth/me", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["user"]["username"], "alice");
    assert_eq!(json["user"]["isActive"], true);
    assert!(json["user"]["createdAt"].is_string());
    assert!(json["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_get_current_user_without_token() {
    let (state, _directory) = create_test_state();
    let app = routes::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Not authorized to access this route");
}

#[tokio::test]
async fn test_get_current_user_with_tampered_token() {
    let (state, directory) = create_test_state();
    let account =
        seed_account(&directory, "alice", "alice@example.com", "Password123", Role::Student).await;
    let app = routes::create_router(state.clone());

    let mut token = token_for(&state, &account.id);
    token.push('x');

    let response = app
        .oneshot(get_with_token("/api/auth/me", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_deleted_account_is_rejected() {
    let (state, directory) = create_test_state();
    let account =
        seed_account(&directory, "alice", "alice@example.com", "Password123", Role::Student).await;
    let app = routes::create_router(state.clone());

    let token = token_for(&state, &account.id);

    directory.delete(account.id).await.unwrap();

    let response = app
        .oneshot(get_with_token("/api/auth/me", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout() {
    let (state, directory) = create_test_state();
    let account =
        seed_account(&directory, "alice", "alice@example.com", "Password123", Role::Student).await;
    let app = routes::create_router(state.clone());

    let token = token_for(&state, &account.id);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Logout successful");

    // Tokens are stateless; the token still verifies after logout
    let response = app
        .oneshot(get_with_token("/api/auth/me", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_requires_token() {
    let (state, _directory) = create_test_state();
    let app = routes::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_then_login_round_trip() {
    let (state, _directory) = create_test_state();
    let app = routes::create_router(state);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "Password123",
                "firstName": "Bob",
                "lastName": "Builder"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "username": "bob", "password": "Password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoint_is_public() {
    let (state, _directory) = create_test_state();
    let app = routes::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}
