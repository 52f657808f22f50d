//! Client aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, UserId};

/// A billed customer
///
/// `created_by` exists for audit purposes only; it is not an access
/// boundary; any authorized user sees every client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier
    pub id: ClientId,
    /// Full name
    pub name: String,
    /// Contact email, unique
    pub email: String,
    /// CPF in canonical `XXX.XXX.XXX-XX` form, unique
    pub cpf: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// User that registered the client
    pub created_by: UserId,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Creates a new client; `cpf` must already be canonical
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        cpf: impl Into<String>,
        phone: Option<String>,
        address: Option<String>,
        created_by: UserId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ClientId::new_v7(),
            name: name.into(),
            email: email.into(),
            cpf: cpf.into(),
            phone,
            address,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}
