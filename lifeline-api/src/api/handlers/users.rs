use axum::{extract::State, Json};
use tracing::{info, instrument};

use lifeline_data::models::UserPatch;
use lifeline_domain::services::{LoginRequest, LoginResponse, RegisterRequest, UserService};

use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, CurrentUser};
use crate::entities::{
    DataResponse, DeletedResponse, ErrorResponse, UpdatedUserResponse, UserResponse, UserSummaryResponse,
};

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid input or email already registered", body = ErrorResponse)
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn register(
    State(users): State<UserService>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = users.register(request).await?;
    info!("Registered user {}", user.id);
    Ok(Json(DataResponse::success(user)))
}

/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid password", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn login(
    State(users): State<UserService>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(users.login(request).await?))
}

/// Identity of the caller
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Caller identity", body = UserSummaryResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserSummaryResponse> {
    Json(DataResponse::success(user.summary()))
}

/// Update the caller's profile
#[utoipa::path(
    patch,
    path = "/api/users/me",
    request_body = UserPatch,
    responses(
        (status = 200, description = "Updated row, or null if it vanished", body = UpdatedUserResponse),
        (status = 400, description = "No fields to update", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn update_me(
    State(users): State<UserService>,
    CurrentUser(user): CurrentUser,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Json<UpdatedUserResponse>, ApiError> {
    let updated = users.update_profile(&user, patch).await?;
    Ok(Json(DataResponse::success(updated)))
}

/// Delete the caller's account
#[utoipa::path(
    delete,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Account deleted", body = DeletedResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn delete_me(
    State(users): State<UserService>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DeletedResponse>, ApiError> {
    users.delete_account(&user).await?;
    Ok(Json(DeletedResponse::success()))
}
