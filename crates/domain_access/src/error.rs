//! Access domain errors

use thiserror::Error;

use core_kernel::PortError;

use crate::matrix::AccessDenied;

/// Errors that can occur in the access domain
#[derive(Debug, Error)]
pub enum AccessError {
    /// The permission matrix denied the action
    #[error(transparent)]
    Denied(#[from] AccessDenied),

    /// Referenced user does not exist
    #[error("User not found: {0}")]
    NotFound(String),

    /// Malformed input rejected before any state change
    #[error("Validation error: {0}")]
    Validation(String),

    /// Username or email already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Login failed; deliberately does not say which credential was wrong
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been deactivated
    #[error("User is inactive")]
    Inactive,

    /// Legal shape but illegal state transition
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Store or hashing adapter failure
    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl AccessError {
    pub fn validation(message: impl Into<String>) -> Self {
        AccessError::Validation(message.into())
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        AccessError::BusinessRule(message.into())
    }
}
