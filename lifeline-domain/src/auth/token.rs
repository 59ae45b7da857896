use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::Claims;
use crate::config::JwtConfig;

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// No signing secret is configured
    #[error("JWT secret not configured")]
    NotConfigured,

    /// No bearer token on the request
    #[error("Not authenticated")]
    MissingCredentials,

    /// Bad signature, malformed or expired token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Token verified but carries no subject
    #[error("Invalid token (no sub)")]
    MissingSubject,

    /// Token could not be signed
    #[error("Token encoding error: {0}")]
    Encoding(String),

    /// Password could not be hashed or checked
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

/// Issues and verifies HS256 access tokens
#[derive(Clone)]
pub struct TokenService {
    secret: Option<String>,
    expiration: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret_set", &self.secret.is_some())
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            expiration: Duration::hours(config.expiration_hours),
        }
    }

    fn secret(&self) -> Result<&[u8], SecurityError> {
        match &self.secret {
            Some(secret) => Ok(secret.as_bytes()),
            None => {
                error!("JWT_SECRET is not set; cannot issue or verify tokens");
                Err(SecurityError::NotConfigured)
            }
        }
    }

    /// Sign a token whose subject is `auth_id`
    pub fn issue_token(&self, auth_id: &str) -> Result<String, SecurityError> {
        let secret = self.secret()?;
        let now = Utc::now();
        let expiration = now + self.expiration;

        let claims = Claims {
            sub: Some(auth_id.to_string()),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret))
            .map_err(|e| SecurityError::Encoding(e.to_string()))?;

        debug!("Issued token for {} expiring at {}", auth_id, expiration);
        Ok(token)
    }

    /// Verify a token and return its claims together with the subject
    pub fn verify_token(&self, token: &str) -> Result<(String, Claims), SecurityError> {
        let secret = self.secret()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                SecurityError::InvalidToken
            })?;

        let claims = token_data.claims;
        match claims.sub.clone().filter(|sub| !sub.is_empty()) {
            Some(sub) => Ok((sub, claims)),
            None => Err(SecurityError::MissingSubject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service(secret: Option<&str>) -> TokenService {
        TokenService::new(&JwtConfig {
            secret: secret.map(String::from),
            expiration_hours: 24,
        })
    }

    fn sign(value: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &value,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_verify_token() {
        let tokens = service(Some("test_secret_key_for_testing_only"));

        let token = tokens.issue_token("auth-123").unwrap();
        assert!(!token.is_empty());

        let (sub, claims) = tokens.verify_token(&token).unwrap();
        assert_eq!(sub, "auth-123");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_missing_secret() {
        let tokens = service(None);
        assert!(matches!(tokens.issue_token("a"), Err(SecurityError::NotConfigured)));
        assert!(matches!(tokens.verify_token("x.y.z"), Err(SecurityError::NotConfigured)));
    }

    #[test]
    fn test_expired_token() {
        let tokens = service(Some("secret"));
        let now = Utc::now().timestamp();
        let token = sign(json!({"sub": "auth-1", "iat": now - 7200, "exp": now - 3600}), "secret");

        assert!(matches!(tokens.verify_token(&token), Err(SecurityError::InvalidToken)));
    }

    #[test]
    fn test_wrong_signature_and_garbage() {
        let tokens = service(Some("secret"));
        let exp = Utc::now().timestamp() + 3600;
        let forged = sign(json!({"sub": "auth-1", "exp": exp}), "other-secret");

        assert!(matches!(tokens.verify_token(&forged), Err(SecurityError::InvalidToken)));
        assert!(matches!(tokens.verify_token("invalid.token.format"), Err(SecurityError::InvalidToken)));
    }

    #[test]
    fn test_token_without_subject() {
        let tokens = service(Some("secret"));
        let exp = Utc::now().timestamp() + 3600;
        let token = sign(json!({"exp": exp}), "secret");

        assert!(matches!(tokens.verify_token(&token), Err(SecurityError::MissingSubject)));
    }
}
