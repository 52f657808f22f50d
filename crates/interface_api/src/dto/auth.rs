//! Authentication DTOs

use serde::{Deserialize, Serialize};

use domain_access::User;

use crate::dto::users::UserResponse;

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub must_change_password: bool,
    pub user: UserResponse,
}

impl LoginResponse {
    pub fn new(token: String, user: &User) -> Self {
        Self {
            access_token: token,
            token_type: "bearer".to_string(),
            must_change_password: user.must_change_password,
            user: UserResponse::from(user),
        }
    }
}

/// Self-service password change body
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}
