use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use lifeline_domain::auth::SecurityError;
use lifeline_domain::services::ServiceError;

use crate::entities::ErrorResponse;

/// Errors returned by handlers, rendered as [`ErrorResponse`] bodies
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request: bad JSON, path id or multipart body
    #[error("{0}")]
    BadRequest(String),

    /// Well-formed input the service refused
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Security(#[from] SecurityError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Security(e) => e.status_code(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Validation(_) => "validation_error",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal_error",
            ApiError::Security(_) => "security_error",
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ApiError::Validation(msg),
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            ServiceError::Storage(msg) | ServiceError::Model(msg) => ApiError::Internal(msg),
            ServiceError::Repository(e) => {
                error!("Repository failure: {}", e);
                ApiError::Internal(e.to_string())
            }
            ServiceError::Security(e) => ApiError::Security(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Security(e) = self {
            return e.into_response();
        }

        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            details: None,
        };
        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
