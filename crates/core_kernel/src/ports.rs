//! Ports and Adapters Infrastructure
//!
//! Foundational types for the hexagonal (ports and adapters) seam between
//! the domain crates and their collaborators. Each domain defines its own
//! port traits (stores, validators, renderers); adapters in `infra_db`,
//! `interface_api` and `test_utils` implement them.
//!
//! ```rust,ignore
//! // In domain_billing/src/ports.rs
//! #[async_trait]
//! pub trait BillStore: DomainPort {
//!     async fn get_bill(&self, id: BillId) -> Result<Option<Bill>, PortError>;
//! }
//!
//! // In infra_db - Postgres adapter
//! impl BillStore for PgBillStore { ... }
//!
//! // In test_utils - in-memory adapter
//! impl BillStore for MemoryBillStore { ... }
//! ```

use thiserror::Error;

/// Error type for port operations
///
/// A unified error all port implementations map into, keeping error handling
/// consistent across database adapters and in-memory test doubles.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// A validation error occurred inside the adapter
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The operation conflicts with existing data (e.g. unique key)
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An internal adapter error occurred
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PortError {
    /// Creates a NotFound error for an entity type and id
    pub fn not_found(entity_type: impl Into<String>, id: impl std::fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error with a message
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates an Internal error with a message
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
        }
    }
}

/// Marker trait for domain port implementations
///
/// All adapters implement this marker so application wiring can constrain
/// generic parameters to "things that are ports".
pub trait DomainPort: Send + Sync {}
