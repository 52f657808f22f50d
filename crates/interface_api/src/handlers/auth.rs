//! Authentication handlers

use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use domain_access::Actor;

use crate::auth::create_token;
use crate::dto::auth::{ChangePasswordRequest, LoginRequest, LoginResponse};
use crate::dto::users::UserResponse;
use crate::error::ApiError;
use crate::AppState;

/// Resolves credentials to a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .access
        .authenticate(&request.username, &request.password)
        .await?;

    let token = create_token(
        user.id,
        &user.username,
        &state.config.jwt_secret,
        state.config.jwt_expiration_secs,
    )
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(LoginResponse::new(token, &user)))
}

/// Returns the calling user's own account
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.access.current_user(&actor).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Self-service password change
pub async fn change_password(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .access
        .change_own_password(&actor, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(json!({ "message": "password changed" })))
}
