use thiserror::Error;
use crate::database::DatabaseError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique or not-null constraint rejected the write
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Blocking task failed to complete
    #[error("Storage task failed: {0}")]
    Task(String),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(error: rusqlite::Error) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                RepositoryError::Constraint(
                    message.clone().unwrap_or_else(|| code.to_string()),
                )
            }
            _ => RepositoryError::Sqlite(error),
        }
    }
}

impl From<tokio::task::JoinError> for RepositoryError {
    fn from(error: tokio::task::JoinError) -> Self {
        RepositoryError::Task(error.to_string())
    }
}
