mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn test_register_hides_password_and_rejects_duplicates() {
    let app = TestApp::new();
    let registration = json!({
        "name": "Meera",
        "email": "meera@example.com",
        "password": "hunter22"
    });

    let (status, body) = app
        .call(Method::POST, "/api/users", None, Some(registration.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["email"], "meera@example.com");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = app.call(Method::POST, "/api/users", None, Some(registration)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::new();
    app.login_as("arjun@example.com").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "email": "ghost@example.com", "password": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "email": "arjun@example.com", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid password");
}

#[tokio::test]
async fn test_login_returns_bearer_token() {
    let app = TestApp::new();
    app.login_as("kiran@example.com").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "email": "kiran@example.com", "password": "s3cret-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["email"], "kiran@example.com");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_profile_lifecycle() {
    let app = TestApp::new();
    let token = app.login_as("sara@example.com").await;

    let (status, body) = app.call(Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "sara@example.com");
    assert!(body["data"]["auth_id"].is_string());
    assert!(body["data"].get("name").is_none());

    let (status, body) = app
        .call(
            Method::PATCH,
            "/api/users/me",
            Some(&token),
            Some(json!({ "phone_no": "+91 98765 43210", "age": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone_no"], "+91 98765 43210");
    assert_eq!(body["data"]["age"], 34);

    let (status, body) = app
        .call(Method::PATCH, "/api/users/me", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No fields to update");

    let (status, body) = app.call(Method::DELETE, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    // The token is still valid but no longer maps to a user
    let (status, body) = app.call(Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User not registered in users table");
}
