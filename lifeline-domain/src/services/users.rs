use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use lifeline_data::models::{NewUser, User, UserPatch};
use lifeline_data::repository::UserRepository;

use super::ServiceError;
use crate::auth::logging::{log_access_denied, log_failed_login, log_registration, log_successful_login};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::TokenService;

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email address is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: Option<i64>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub phone_no: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LoginResponse {
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
    pub user: User,
}

/// Turn validator output into one readable message
fn validation_message(errors: validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let details: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, details.join(", "))
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// Accounts, login and caller resolution
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { repository, tokens }
    }

    /// Register a new account with a fresh `auth_id`
    pub async fn register(&self, mut request: RegisterRequest) -> Result<User, ServiceError> {
        request.email = request.email.trim().to_string();
        request
            .validate()
            .map_err(|e| ServiceError::Validation(validation_message(e)))?;

        let new_user = NewUser {
            auth_id: Uuid::new_v4().to_string(),
            name: request.name,
            email: request.email,
            password_hash: hash_password(&request.password).await?,
            age: request.age,
            blood_group: request.blood_group,
            phone_no: request.phone_no,
        };
        let email = new_user.email.clone();

        // Any store failure is reported to the client as a bad request
        match self.repository.insert(new_user).await {
            Ok(user) => {
                log_registration(&email, true, None);
                Ok(user)
            }
            Err(e) => {
                log_registration(&email, false, Some(&e.to_string()));
                Err(ServiceError::Validation(e.to_string()))
            }
        }
    }

    /// Check credentials and issue an access token
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let email = request.email.trim();
        let user = match self.repository.find_by_email(email).await? {
            Some(user) => user,
            None => {
                log_failed_login(email, "unknown email");
                return Err(ServiceError::NotFound("User not found".to_string()));
            }
        };

        if !verify_password(&request.password, &user.password_hash).await? {
            log_failed_login(email, "wrong password");
            return Err(ServiceError::Unauthorized("Invalid password".to_string()));
        }

        let access_token = self.tokens.issue_token(&user.auth_id)?;
        log_successful_login(&user.auth_id);

        Ok(LoginResponse {
            access_token,
            token_type: "bearer".to_string(),
            user,
        })
    }

    /// Map a verified token subject to its user row
    pub async fn resolve(&self, auth_id: &str) -> Result<User, ServiceError> {
        match self.repository.find_by_auth_id(auth_id).await? {
            Some(user) => {
                debug!("Resolved {} to user {}", auth_id, user.id);
                Ok(user)
            }
            None => {
                log_access_denied(auth_id, "no users row for token subject");
                Err(ServiceError::Unauthorized("User not registered in users table".to_string()))
            }
        }
    }

    /// Update profile fields; `None` when the row vanished meanwhile
    pub async fn update_profile(&self, user: &User, patch: UserPatch) -> Result<Option<User>, ServiceError> {
        let updated = self.repository.update(user.id, patch).await?;
        info!("Updated profile of user {}", user.id);
        Ok(updated)
    }

    pub async fn delete_account(&self, user: &User) -> Result<(), ServiceError> {
        self.repository.delete(user.id).await?;
        info!("Deleted user {}", user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use lifeline_data::database::{create_pool, DatabaseConfig};
    use lifeline_data::repository::SqliteUserRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn service() -> UserService {
        let pool = create_pool(&DatabaseConfig::in_memory()).unwrap();
        let tokens = TokenService::new(&JwtConfig {
            secret: Some("user-service-secret".to_string()),
            expiration_hours: 24,
        });
        UserService::new(Arc::new(SqliteUserRepository::new(pool)), tokens)
    }

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ravi".to_string(),
            email: email.to_string(),
            password: "pa55word".to_string(),
            age: Some(40),
            blood_group: Some("A+".to_string()),
            phone_no: None,
        }
    }

    #[tokio::test]
    async fn test_register_login_and_resolve() {
        let service = service();
        let user = service.register(registration("ravi@example.com")).await.unwrap();
        assert_ne!(user.password_hash, "pa55word");
        assert_eq!(user.auth_id.len(), 36);

        let login = service
            .login(LoginRequest {
                email: "ravi@example.com".to_string(),
                password: "pa55word".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.token_type, "bearer");
        assert_eq!(login.user.id, user.id);

        let resolved = service.resolve(&user.auth_id).await.unwrap();
        assert_eq!(resolved.email, "ravi@example.com");
    }

    #[tokio::test]
    async fn test_login_failures() {
        let service = service();
        service.register(registration("ravi@example.com")).await.unwrap();

        let unknown = service
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "x".to_string(),
            })
            .await;
        assert!(matches!(unknown, Err(ServiceError::NotFound(msg)) if msg == "User not found"));

        let wrong = service
            .login(LoginRequest {
                email: "ravi@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(ServiceError::Unauthorized(msg)) if msg == "Invalid password"));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let service = service();
        service.register(registration("ravi@example.com")).await.unwrap();

        let result = service.register(registration("ravi@example.com")).await;
        assert!(matches!(result, Err(ServiceError::Validation(msg)) if msg.contains("UNIQUE")));
    }

    #[tokio::test]
    async fn test_invalid_registration() {
        let service = service();
        let mut request = registration("not-an-email");
        request.password = String::new();

        match service.register(request).await {
            Err(ServiceError::Validation(msg)) => {
                assert!(msg.contains("email"));
                assert!(msg.contains("password"));
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_email_is_trimmed_before_validation() {
        let service = service();
        let user = service.register(registration("  ravi@example.com ")).await.unwrap();
        assert_eq!(user.email, "ravi@example.com");

        let login = service
            .login(LoginRequest {
                email: " ravi@example.com".to_string(),
                password: "pa55word".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.user.id, user.id);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_register_does_not_stall_other_tasks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let ticker = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(5)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        service().register(registration("ravi@example.com")).await.unwrap();
        ticker.abort();

        assert!(ticks.load(Ordering::SeqCst) > 1, "ticker stalled during register");
    }

    #[tokio::test]
    async fn test_unknown_subject_is_unauthorized() {
        let result = service().resolve("no-such-auth-id").await;
        assert!(matches!(
            result,
            Err(ServiceError::Unauthorized(msg)) if msg == "User not registered in users table"
        ));
    }
}
