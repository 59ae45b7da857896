use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// Password login
    Login,
    /// Login rejected
    FailedLogin,
    /// Account created
    Registration,
    /// Bearer token checked on a protected route
    TokenValidation,
    /// Valid token whose subject has no local account
    AccessDenied,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::Login => write!(f, "LOGIN"),
            AuthEventType::FailedLogin => write!(f, "FAILED_LOGIN"),
            AuthEventType::Registration => write!(f, "REGISTRATION"),
            AuthEventType::TokenValidation => write!(f, "TOKEN_VALIDATION"),
            AuthEventType::AccessDenied => write!(f, "ACCESS_DENIED"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// Auth id or email, when known
    pub subject: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub success: bool,
    pub details: Option<String>,
    /// Request path being accessed
    pub resource: Option<String>,
    pub duration_ms: Option<u64>,
    /// Authentication method used (password, jwt)
    pub auth_method: Option<String>,
}

impl AuthEvent {
    /// Create a new authentication event
    pub fn new(event_type: AuthEventType, subject: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            subject: subject.map(String::from),
            timestamp: Utc::now(),
            user_agent: None,
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }
}

/// Log an authentication event
pub fn log_auth_event(event: AuthEvent) {
    let subject = event.subject.as_deref().unwrap_or("anonymous");
    let details = event.details.as_deref().unwrap_or("");
    let resource = event.resource.as_deref().unwrap_or("-");

    if event.success {
        info!(
            "AUTH-LOG [{}] [{}] [SUCCESS] [{}] {}",
            event.event_type, subject, resource, details
        );
    } else {
        warn!(
            "AUTH-LOG [{}] [{}] [FAILURE] [{}] {}",
            event.event_type, subject, resource, details
        );
    }
}

/// Log a successful password login
pub fn log_successful_login(auth_id: &str) {
    let event = AuthEvent::new(AuthEventType::Login, Some(auth_id), true).with_auth_method("password");
    log_auth_event(event);
}

/// Log a rejected login attempt
pub fn log_failed_login(email: &str, reason: &str) {
    let event = AuthEvent::new(AuthEventType::FailedLogin, Some(email), false)
        .with_details(reason)
        .with_auth_method("password");
    log_auth_event(event);
}

/// Log an account registration
pub fn log_registration(email: &str, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::Registration, Some(email), success);
    if let Some(d) = details {
        event = event.with_details(d);
    }
    log_auth_event(event);
}

/// Log a token whose subject has no local account
pub fn log_access_denied(auth_id: &str, reason: &str) {
    let event = AuthEvent::new(AuthEventType::AccessDenied, Some(auth_id), false)
        .with_details(reason)
        .with_auth_method("jwt");
    log_auth_event(event);
}
