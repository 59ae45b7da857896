//! Request extractors that report failures as [`ApiError`] bodies

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use lifeline_data::models::User;
use lifeline_domain::auth::{AuthIdentity, SecurityError};
use lifeline_domain::services::UserService;

use super::error::ApiError;

/// The registered user behind the request's bearer token
///
/// Requires [`lifeline_domain::auth::auth_middleware`] to have run first.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    UserService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<AuthIdentity>()
            .ok_or(ApiError::Security(SecurityError::MissingCredentials))?;

        let users = UserService::from_ref(state);
        let user = users.resolve(&identity.auth_id).await?;
        Ok(CurrentUser(user))
    }
}

/// Integer row id taken from the single path parameter
#[derive(Debug, Clone, Copy)]
pub struct RecordId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        raw.trim()
            .parse::<i64>()
            .map(RecordId)
            .map_err(|_| {
                debug!("Rejected non-integer id {:?}", raw);
                ApiError::BadRequest(format!("Invalid id: {}", raw))
            })
    }
}

/// JSON body whose rejections become 400 error bodies
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// Query string whose rejections become 400 error bodies
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(ApiQuery(value))
    }
}
