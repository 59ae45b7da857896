//! Password hashing with bcrypt
//!
//! bcrypt is deliberately slow, so both operations run on the blocking pool.

use super::SecurityError;

/// Hash a plaintext password with the default bcrypt cost
pub async fn hash_password(password: &str) -> Result<String, SecurityError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| SecurityError::PasswordHash(e.to_string()))?
        .map_err(|e| SecurityError::PasswordHash(e.to_string()))
}

/// Check a plaintext password against a stored hash
///
/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, SecurityError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .map_err(|e| SecurityError::PasswordHash(e.to_string()))
}
