//! User management and authentication service
//!
//! Every method follows the same order: authorize against the permission
//! matrix, validate input, load state, execute, then append one audit entry.
//! Failures short-circuit before any write, so a failed operation never
//! leaves a partial mutation or an audit record.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, instrument};

use core_kernel::UserId;
use domain_audit::{ActivityEntry, ActivityKind, ActivityQuery, AuditLog};

use crate::error::AccessError;
use crate::matrix::{authorize, Action, Actor};
use crate::ports::{PasswordHasher, UserStore};
use crate::role::{PermissionGrants, Role};
use crate::user::User;

const MIN_PASSWORD_LEN: usize = 6;

/// Request to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub grants: PermissionGrants,
}

/// Partial update to an existing user; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub grants: Option<PermissionGrants>,
    pub active: Option<bool>,
}

/// Application service for users, authentication and the activity-log read
/// side
#[derive(Clone)]
pub struct AccessService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    audit: Arc<dyn AuditLog>,
}

impl AccessService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            users,
            hasher,
            audit,
        }
    }

    /// Creates a user on behalf of `actor`.
    ///
    /// Managers may only create reception and sales users; administrators
    /// may create any role (matrix rule 2/3).
    #[instrument(skip(self, request), fields(actor = %actor.name, username = %request.username))]
    pub async fn create_user(&self, actor: &Actor, request: NewUser) -> Result<User, AccessError> {
        authorize(actor, &Action::CreateUser { role: request.role })?;

        let username = request.username.trim();
        if username.len() < 3 {
            return Err(AccessError::validation(
                "username must have at least 3 characters",
            ));
        }
        if !request.email.contains('@') {
            return Err(AccessError::validation("invalid email address"));
        }
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(AccessError::validation(
                "password must have at least 6 characters",
            ));
        }

        if self.users.get_by_username(username).await?.is_some() {
            return Err(AccessError::Conflict(format!(
                "username already taken: {username}"
            )));
        }

        let hash = self.hasher.hash(&request.password)?;
        let user = User::new(
            username,
            request.email.trim(),
            hash,
            request.role,
            request.grants,
            Some(actor.id),
        );
        self.users.insert(&user).await?;

        info!(user_id = %user.id, role = %user.role, "user created");
        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::UserCreated,
                format!("Created user {} ({})", user.username, user.role),
                json!({ "user_id": user.id, "role": user.role }),
            ))
            .await?;

        Ok(user)
    }

    /// Updates role, grants, email or activation of an existing user.
    ///
    /// Authorization is checked against both the target's current role and
    /// the requested one, so a manager can neither touch an administrator
    /// nor promote a receptionist into one.
    #[instrument(skip(self, update), fields(actor = %actor.name, target = %id))]
    pub async fn update_user(
        &self,
        actor: &Actor,
        id: UserId,
        update: UserUpdate,
    ) -> Result<User, AccessError> {
        let mut user = self.load_managed_user(actor, id).await?;

        if let Some(new_role) = update.role {
            authorize(actor, &Action::UpdateUser { target_role: new_role })?;
            if user.is_bootstrap_admin() && new_role != Role::Administrator {
                return Err(AccessError::business_rule(
                    "the bootstrap administrator cannot be demoted",
                ));
            }
            user.role = new_role;
        }
        if let Some(email) = update.email {
            if !email.contains('@') {
                return Err(AccessError::validation("invalid email address"));
            }
            user.email = email.trim().to_string();
        }
        if let Some(grants) = update.grants {
            user.grants = grants;
        }
        if let Some(active) = update.active {
            if user.is_bootstrap_admin() && !active {
                return Err(AccessError::business_rule(
                    "the bootstrap administrator cannot be deactivated",
                ));
            }
            user.active = active;
        }
        user.updated_at = chrono::Utc::now();

        self.users.update(&user).await?;

        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::UserUpdated,
                format!("Updated user {}", user.username),
                json!({ "user_id": user.id, "role": user.role, "active": user.active }),
            ))
            .await?;

        Ok(user)
    }

    /// Resets another user's password, forcing a change on next login
    #[instrument(skip(self, new_password), fields(actor = %actor.name, target = %id))]
    pub async fn reset_password(
        &self,
        actor: &Actor,
        id: UserId,
        new_password: &str,
    ) -> Result<(), AccessError> {
        let mut user = self.load_managed_user(actor, id).await?;

        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AccessError::validation(
                "password must have at least 6 characters",
            ));
        }

        let hash = self.hasher.hash(new_password)?;
        user.set_password_hash(hash);
        user.must_change_password = true;
        self.users.update(&user).await?;

        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::UserPasswordReset,
                format!("Reset password for {}", user.username),
                json!({ "user_id": user.id }),
            ))
            .await?;

        Ok(())
    }

    /// Deletes a user. Administrators only; the bootstrap admin is protected.
    #[instrument(skip(self), fields(actor = %actor.name, target = %id))]
    pub async fn delete_user(&self, actor: &Actor, id: UserId) -> Result<(), AccessError> {
        authorize(actor, &Action::DeleteUser)?;

        let user = self
            .users
            .get(id)
            .await?
            .ok_or_else(|| AccessError::NotFound(id.to_string()))?;
        if user.is_bootstrap_admin() {
            return Err(AccessError::business_rule(
                "the bootstrap administrator cannot be deleted",
            ));
        }

        self.users.delete(id).await?;

        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::UserDeleted,
                format!("Deleted user {}", user.username),
                json!({ "user_id": user.id }),
            ))
            .await?;

        Ok(())
    }

    /// Lists all users
    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<User>, AccessError> {
        authorize(actor, &Action::ListUsers)?;
        Ok(self.users.list().await?)
    }

    /// Returns the caller's own account
    pub async fn current_user(&self, actor: &Actor) -> Result<User, AccessError> {
        self.users
            .get(actor.id)
            .await?
            .ok_or_else(|| AccessError::NotFound(actor.id.to_string()))
    }

    /// Self-service password change; verifies the current password first
    #[instrument(skip(self, current_password, new_password), fields(actor = %actor.name))]
    pub async fn change_own_password(
        &self,
        actor: &Actor,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccessError> {
        authorize(actor, &Action::ChangeOwnPassword { target: actor.id })?;

        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AccessError::validation(
                "password must have at least 6 characters",
            ));
        }

        let mut user = self
            .users
            .get(actor.id)
            .await?
            .ok_or_else(|| AccessError::NotFound(actor.id.to_string()))?;

        if !self.hasher.verify(current_password, &user.password_hash)? {
            return Err(AccessError::InvalidCredentials);
        }

        let hash = self.hasher.hash(new_password)?;
        user.set_password_hash(hash);
        self.users.update(&user).await?;

        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::PasswordChanged,
                format!("{} changed their password", user.username),
                json!({ "user_id": user.id }),
            ))
            .await?;

        Ok(())
    }

    /// Resolves login credentials to an active user.
    ///
    /// Missing users and wrong passwords collapse into the same error so the
    /// response does not leak which usernames exist.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AccessError> {
        let user = self
            .users
            .get_by_username(username.trim())
            .await?
            .ok_or(AccessError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(AccessError::InvalidCredentials);
        }
        if !user.active {
            return Err(AccessError::Inactive);
        }

        Ok(user)
    }

    /// Activity-log read side; administrators only (matrix rule 1)
    pub async fn view_activity(
        &self,
        actor: &Actor,
        query: &ActivityQuery,
    ) -> Result<Vec<domain_audit::ActivityEntry>, AccessError> {
        authorize(actor, &Action::ViewActivityLog)?;
        Ok(self.audit.find(query).await?)
    }

    /// Loads a user and authorizes the edit against its *current* role
    async fn load_managed_user(&self, actor: &Actor, id: UserId) -> Result<User, AccessError> {
        // Authorize before the lookup with the weakest target role a manager
        // may touch, then re-check against the real role once loaded. This
        // keeps "may I edit users at all" ahead of any existence probe.
        authorize(
            actor,
            &Action::UpdateUser {
                target_role: Role::Reception,
            },
        )?;

        let user = self
            .users
            .get(id)
            .await?
            .ok_or_else(|| AccessError::NotFound(id.to_string()))?;

        authorize(
            actor,
            &Action::UpdateUser {
                target_role: user.role,
            },
        )?;

        Ok(user)
    }
}
