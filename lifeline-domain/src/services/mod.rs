// Domain services
// This module contains business logic implementations.

pub mod records;
pub mod reports;
pub mod users;

pub use records::{RecordService, Resource};
pub use reports::{ReportService, OCR_FALLBACK_TEXT};
pub use users::{LoginRequest, LoginResponse, RegisterRequest, UserService};

use thiserror::Error;

use lifeline_data::repository::RepositoryError;

/// Errors returned by domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected before or by the store
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Credentials or account checks failed
    #[error("{0}")]
    Unauthorized(String),

    /// Uploaded file could not be stored
    #[error("{0}")]
    Storage(String),

    /// The language model or agent failed; the message is client facing
    #[error("{0}")]
    Model(String),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),

    #[error(transparent)]
    Security(#[from] crate::auth::SecurityError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(msg) => ServiceError::Validation(msg),
            other => ServiceError::Repository(other),
        }
    }
}
