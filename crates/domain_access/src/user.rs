//! User aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::UserId;

use crate::matrix::Actor;
use crate::role::{PermissionGrants, Role};

/// Username of the bootstrap administrator account
///
/// This account is seeded at startup, can never be deleted and can never be
/// deactivated.
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

/// A system user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Login name, unique case-insensitively
    pub username: String,
    /// Contact email
    pub email: String,
    /// Argon2 PHC-format password hash; never the plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role deciding the permission-matrix row
    pub role: Role,
    /// Capability overrides, consulted for Reception only
    pub grants: PermissionGrants,
    /// Inactive users cannot authenticate
    pub active: bool,
    /// Forces a password change on next login
    pub must_change_password: bool,
    /// Who created this account (None for the bootstrap admin)
    pub created_by: Option<UserId>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active user
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        grants: PermissionGrants,
        created_by: Option<UserId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new_v7(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            grants,
            active: true,
            must_change_password: false,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// True for the seeded administrator account, which is protected from
    /// deletion and deactivation
    pub fn is_bootstrap_admin(&self) -> bool {
        self.username.eq_ignore_ascii_case(BOOTSTRAP_ADMIN_USERNAME)
    }

    /// Projects this user into the identity triple the matrix rules on
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.username.clone(), self.role, self.grants.clone())
    }

    /// Applies a password change, clearing any forced-change flag
    pub fn set_password_hash(&mut self, hash: impl Into<String>) {
        self.password_hash = hash.into();
        self.must_change_password = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_admin_is_detected_case_insensitively() {
        let mut user = User::new(
            "ADMIN",
            "admin@sistema.com",
            "hash",
            Role::Administrator,
            PermissionGrants::none(),
            None,
        );
        assert!(user.is_bootstrap_admin());

        user.username = "maria".to_string();
        assert!(!user.is_bootstrap_admin());
    }

    #[test]
    fn password_change_clears_forced_flag() {
        let mut user = User::new(
            "maria",
            "maria@example.com",
            "old-hash",
            Role::Reception,
            PermissionGrants::none(),
            None,
        );
        user.must_change_password = true;

        user.set_password_hash("new-hash");

        assert_eq!(user.password_hash, "new-hash");
        assert!(!user.must_change_password);
    }
}
