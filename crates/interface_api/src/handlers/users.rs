//! User management handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use core_kernel::UserId;
use domain_access::{Actor, NewUser, UserUpdate};

use crate::dto::users::{
    CreateUserRequest, ResetPasswordRequest, UpdateUserRequest, UserResponse,
};
use crate::error::ApiError;
use crate::AppState;

/// Creates a user (admin: any role; manager: reception/sales only)
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let user = state
        .access
        .create_user(
            &actor,
            NewUser {
                username: request.username,
                email: request.email,
                password: request.password,
                role: request.role,
                grants: request.grants,
            },
        )
        .await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Lists all users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.access.list_users(&actor).await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// Updates role, grants, email or activation
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .access
        .update_user(
            &actor,
            UserId::from(id),
            UserUpdate {
                email: request.email,
                role: request.role,
                grants: request.grants,
                active: request.active,
            },
        )
        .await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Administrative password reset; forces a change on next login
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    state
        .access
        .reset_password(&actor, UserId::from(id), &request.new_password)
        .await?;
    Ok(Json(json!({ "message": "password reset" })))
}

/// Deletes a user (administrators only)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.access.delete_user(&actor, UserId::from(id)).await?;
    Ok(Json(json!({ "message": "user deleted" })))
}
