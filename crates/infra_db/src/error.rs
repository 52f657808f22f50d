//! Database error types and their translation into port errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors raised by the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Underlying SQLx failure
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A stored value could not be decoded into its domain type
    #[error("Decode error: {0}")]
    Decode(String),

    /// Migration failure
    #[error("Migration error: {0}")]
    Migration(String),
}

impl DatabaseError {
    pub fn decode(message: impl Into<String>) -> Self {
        DatabaseError::Decode(message.into())
    }
}

/// Maps database failures onto the unified port error.
///
/// Unique-constraint violations become `Conflict` so the services can
/// surface duplicate usernames/emails/CPFs as such instead of a 500.
impl From<DatabaseError> for PortError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Sqlx(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                PortError::conflict(db.message().to_string())
            }
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) => PortError::Connection {
                message: "connection pool timed out".to_string(),
                source: None,
            },
            DatabaseError::Sqlx(e) => PortError::internal(e.to_string()),
            DatabaseError::Decode(message) => PortError::internal(message),
            DatabaseError::Migration(message) => PortError::internal(message),
        }
    }
}
