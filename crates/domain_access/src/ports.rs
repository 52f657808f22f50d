//! Access domain ports
//!
//! The user store and the password-hashing primitive are collaborators: the
//! core never sees a connection string or a hashing algorithm, only these
//! traits. Adapters live in `infra_db` (Postgres), `interface_api` (Argon2)
//! and `test_utils` (in-memory / plaintext doubles).

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError, UserId};

use crate::user::User;

/// Store for user accounts
#[async_trait]
pub trait UserStore: DomainPort {
    /// Fetches a user by id
    async fn get(&self, id: UserId) -> Result<Option<User>, PortError>;

    /// Fetches a user by username, matching case-insensitively
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, PortError>;

    /// Lists all users, newest first
    async fn list(&self) -> Result<Vec<User>, PortError>;

    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` when the username or email is already taken.
    async fn insert(&self, user: &User) -> Result<(), PortError>;

    /// Persists changes to an existing user
    async fn update(&self, user: &User) -> Result<(), PortError>;

    /// Deletes a user; returns false when no such user existed
    async fn delete(&self, id: UserId) -> Result<bool, PortError>;
}

/// Password hashing primitive
///
/// Kept synchronous: hashing is CPU-bound and the adapters do not block on
/// I/O.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password into a storable string
    fn hash(&self, password: &str) -> Result<String, PortError>;

    /// Verifies a plaintext password against a stored hash
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PortError>;
}
