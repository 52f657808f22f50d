//! User management DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::UserId;
use domain_access::{PermissionGrants, Role, User};

/// Request body for creating a user
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub grants: PermissionGrants,
}

/// Request body for updating a user
#[derive(Debug, Deserialize, Default)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub grants: Option<PermissionGrants>,
    pub active: Option<bool>,
}

/// Request body for an administrative password reset
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// User representation on the wire; never carries the password hash
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub grants: PermissionGrants,
    pub active: bool,
    pub must_change_password: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            grants: user.grants.clone(),
            active: user.active,
            must_change_password: user.must_change_password,
            created_at: user.created_at,
        }
    }
}
