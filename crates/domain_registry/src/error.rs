//! Registry domain errors

use thiserror::Error;

use core_kernel::PortError;
use domain_access::AccessDenied;

/// Errors that can occur in the registry domain
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The permission matrix denied the action
    #[error(transparent)]
    Denied(#[from] AccessDenied),

    /// Referenced product or client does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input rejected before any state change
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique field (code, name, email, CPF) already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Legal shape but illegal state transition
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Store adapter failure
    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl RegistryError {
    pub fn validation(message: impl Into<String>) -> Self {
        RegistryError::Validation(message.into())
    }

    pub fn not_found(what: impl std::fmt::Display) -> Self {
        RegistryError::NotFound(what.to_string())
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        RegistryError::BusinessRule(message.into())
    }
}
