//! Billing domain errors

use thiserror::Error;

use core_kernel::PortError;
use domain_access::AccessDenied;
use domain_registry::RegistryError;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// The permission matrix denied the action
    #[error(transparent)]
    Denied(#[from] AccessDenied),

    /// Referenced bill, installment, client or product does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input rejected before any state change
    #[error("Validation error: {0}")]
    Validation(String),

    /// Legal shape but illegal state transition (pay a paid installment,
    /// cancel a cancelled bill, card-settled expense, nothing to allocate)
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Store adapter failure
    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        BillingError::BusinessRule(message.into())
    }

    pub fn not_found(what: impl std::fmt::Display) -> Self {
        BillingError::NotFound(what.to_string())
    }
}

impl From<RegistryError> for BillingError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Denied(denied) => BillingError::Denied(denied),
            RegistryError::NotFound(what) => BillingError::NotFound(what),
            RegistryError::Validation(message) => BillingError::Validation(message),
            RegistryError::Conflict(message) => BillingError::BusinessRule(message),
            RegistryError::BusinessRule(message) => BillingError::BusinessRule(message),
            RegistryError::Store(port) => BillingError::Store(port),
        }
    }
}
