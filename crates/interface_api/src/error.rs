//! API error handling
//!
//! Maps the domain error taxonomy onto HTTP outcomes:
//! authorization denial → 403, not-found → 404, validation failure → 422,
//! business-rule violation and conflicts → 409, credential failures → 401.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_access::AccessError;
use domain_billing::BillingError;
use domain_registry::RegistryError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::BusinessRule(msg) => (
                StatusCode::CONFLICT,
                "business_rule_violation",
                msg.clone(),
            ),
            ApiError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                msg.clone(),
            ),
            ApiError::Internal(msg) => {
                // Never leak adapter internals to the caller.
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id}"))
            }
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Validation { message } => ApiError::Validation(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Denied(denied) => ApiError::Forbidden(denied.to_string()),
            AccessError::NotFound(what) => ApiError::NotFound(what),
            AccessError::Validation(message) => ApiError::Validation(message),
            AccessError::Conflict(message) => ApiError::Conflict(message),
            AccessError::InvalidCredentials | AccessError::Inactive => ApiError::Unauthorized,
            AccessError::BusinessRule(message) => ApiError::BusinessRule(message),
            AccessError::Store(port) => port.into(),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Denied(denied) => ApiError::Forbidden(denied.to_string()),
            RegistryError::NotFound(what) => ApiError::NotFound(what),
            RegistryError::Validation(message) => ApiError::Validation(message),
            RegistryError::Conflict(message) => ApiError::Conflict(message),
            RegistryError::BusinessRule(message) => ApiError::BusinessRule(message),
            RegistryError::Store(port) => port.into(),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Denied(denied) => ApiError::Forbidden(denied.to_string()),
            BillingError::NotFound(what) => ApiError::NotFound(what),
            BillingError::Validation(message) => ApiError::Validation(message),
            BillingError::BusinessRule(message) => ApiError::BusinessRule(message),
            BillingError::Store(port) => port.into(),
        }
    }
}
