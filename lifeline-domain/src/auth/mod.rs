//! Authentication module for the Lifeline API
//!
//! Protected routes run [`auth_middleware`], which verifies the bearer token
//! and leaves an [`AuthIdentity`] in the request extensions. Mapping that
//! identity to a local user row happens later, in the API layer.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType};

// JWT issuing and verification
pub mod token;

// bcrypt password hashing
pub mod password;

// Structured auth event log
pub mod logging;

pub use token::{SecurityError, TokenService};

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Claims {
    /// Subject: the user's `auth_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued at (as timestamp)
    #[serde(default)]
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Verified caller identity placed in request extensions
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    pub auth_id: String,
    pub claims: Claims,
}

impl SecurityError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            SecurityError::NotConfigured | SecurityError::Encoding(_) | SecurityError::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            SecurityError::MissingCredentials | SecurityError::InvalidToken | SecurityError::MissingSubject => {
                StatusCode::UNAUTHORIZED
            }
        }
    }
}

impl IntoResponse for SecurityError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = if status == StatusCode::UNAUTHORIZED {
            "unauthorized"
        } else {
            "internal_error"
        };
        let mut response = (status, Json(json!({ "error": code, "message": self.to_string() }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Authentication middleware for protected routes
pub async fn auth_middleware(State(tokens): State<TokenService>, mut req: Request, next: Next) -> Response {
    let start_time = std::time::Instant::now();
    let request_path = req.uri().path().to_string();
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);

    let result = match token {
        Some(token) => tokens.verify_token(&token),
        None => Err(SecurityError::MissingCredentials),
    };

    match result {
        Ok((auth_id, claims)) => {
            debug!("Token validated for {}", auth_id);

            let event = AuthEvent::new(AuthEventType::TokenValidation, Some(&auth_id), true)
                .with_resource(request_path)
                .with_user_agent(user_agent)
                .with_duration(start_time.elapsed().as_millis() as u64)
                .with_auth_method("jwt");
            log_auth_event(event);

            req.extensions_mut().insert(AuthIdentity { auth_id, claims });
            next.run(req).await
        }
        Err(e) => {
            warn!("Rejected request to {}: {}", request_path, e);

            let event = AuthEvent::new(AuthEventType::TokenValidation, None, false)
                .with_details(e.to_string())
                .with_resource(request_path)
                .with_user_agent(user_agent)
                .with_duration(start_time.elapsed().as_millis() as u64)
                .with_auth_method("jwt");
            log_auth_event(event);

            e.into_response()
        }
    }
}

/// Apply CORS and security headers to the whole application
pub fn configure_security_layers(app: axum::Router) -> axum::Router {
    use axum::http::{HeaderName, HeaderValue};
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::set_header::SetResponseHeaderLayer;

    // Browser clients are served from arbitrary origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains; preload"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(
                "default-src 'self'; script-src 'self'; connect-src 'self'; img-src 'self' data:; style-src 'self' 'unsafe-inline'; font-src 'self'; frame-ancestors 'none'; form-action 'self'; base-uri 'self'",
            ),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=(), interest-cohort=()"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-permitted-cross-domain-policies"),
            HeaderValue::from_static("none"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ));

    app.layer(cors).layer(security_headers)
}
