//! PostgreSQL adapter for the user store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{DomainPort, PortError, UserId};
use domain_access::{PermissionGrants, Role, User, UserStore};

use crate::error::DatabaseError;

const SELECT_USER: &str = r#"
    SELECT user_id, username, email, password_hash, role, grants, active,
           must_change_password, created_by, created_at, updated_at
    FROM users
"#;

/// Database row for a user
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    grants: String,
    active: bool,
    must_change_password: bool,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, DatabaseError> {
        let role: Role = self
            .role
            .parse()
            .map_err(DatabaseError::decode)?;
        let grants: PermissionGrants = serde_json::from_str(&self.grants)
            .map_err(|e| DatabaseError::decode(format!("grants: {e}")))?;

        Ok(User {
            id: UserId::from(self.user_id),
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role,
            grants,
            active: self.active,
            must_change_password: self.must_change_password,
            created_by: self.created_by.map(UserId::from),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// PostgreSQL-backed implementation of [`UserStore`]
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn grants_json(user: &User) -> Result<String, PortError> {
        serde_json::to_string(&user.grants)
            .map_err(|e| PortError::internal(format!("grants: {e}")))
    }
}

impl DomainPort for PgUserStore {}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get(&self, id: UserId) -> Result<Option<User>, PortError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE user_id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        row.map(|r| r.into_user().map_err(PortError::from)).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, PortError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{SELECT_USER} WHERE LOWER(username) = LOWER($1)"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(|r| r.into_user().map_err(PortError::from)).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, PortError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "{SELECT_USER} ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|r| r.into_user().map_err(PortError::from))
            .collect()
    }

    async fn insert(&self, user: &User) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id, username, email, password_hash, role, grants, active,
                must_change_password, created_by, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(Self::grants_json(user)?)
        .bind(user.active)
        .bind(user.must_change_password)
        .bind(user.created_by.map(Uuid::from))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, role = $4, grants = $5,
                active = $6, must_change_password = $7, updated_at = $8
            WHERE user_id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(Self::grants_json(user)?)
        .bind(user.active)
        .bind(user.must_change_password)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("user", user.id));
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<bool, PortError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        Ok(result.rows_affected() > 0)
    }
}
