#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use lifeline_api::api::{create_app, AppState};
use lifeline_data::database::{create_pool, DatabaseConfig};
use lifeline_data::storage::LocalObjectStore;
use lifeline_domain::auth::TokenService;
use lifeline_domain::config::{AgentConfig, JwtConfig};
use lifeline_domain::testing::{FixedTextExtractor, ScriptedModel};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const OCR_TEXT: &str = "Hemoglobin 13.2 g/dL";
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

pub fn jwt_config(secret: &str, expiration_hours: i64) -> JwtConfig {
    JwtConfig {
        secret: Some(secret.to_string()),
        expiration_hours,
    }
}

/// Router over an in-memory database, a temp upload directory and a scripted model
pub struct TestApp {
    pub router: Router,
    pub model: Arc<ScriptedModel>,
    pub files: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_model(ScriptedModel::new())
    }

    pub fn with_model(model: ScriptedModel) -> Self {
        Self::build(model, Some(JWT_SECRET.to_string()))
    }

    /// App whose token service has no secret configured
    pub fn without_secret() -> Self {
        Self::build(ScriptedModel::new(), None)
    }

    fn build(model: ScriptedModel, secret: Option<String>) -> Self {
        let pool = create_pool(&DatabaseConfig::in_memory()).expect("in-memory pool");
        let files = tempfile::tempdir().expect("temp dir");
        let model = Arc::new(model);

        let state = AppState::new(
            pool,
            TokenService::new(&JwtConfig {
                secret,
                expiration_hours: 24,
            }),
            LocalObjectStore::open(files.path(), "http://localhost:3000/files").expect("object store"),
            Arc::new(FixedTextExtractor::new(OCR_TEXT)),
            model.clone(),
            AgentConfig::default(),
        );

        Self {
            router: create_app(state),
            model,
            files,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, body)
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        self.send(json_request(method, uri, token, body)).await
    }

    /// Register an account and log in, returning the bearer token
    pub async fn login_as(&self, email: &str) -> String {
        let (status, _) = self
            .call(
                Method::POST,
                "/api/users",
                None,
                Some(json!({
                    "name": "Test User",
                    "email": email,
                    "password": "s3cret-pass",
                    "age": 34,
                    "blood_group": "B+"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "registration of {} failed", email);

        let (status, body) = self
            .call(
                Method::POST,
                "/api/users/login",
                None,
                Some(json!({ "email": email, "password": "s3cret-pass" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login of {} failed", email);
        body["access_token"].as_str().expect("access token").to_string()
    }
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request"),
        None => builder.body(Body::empty()).expect("valid request"),
    }
}

pub fn multipart_request(uri: &str, token: &str, field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "lifeline-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .expect("valid request")
}
