//! Product and client DTOs

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

/// Request body for creating a product
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    /// Unit price in BRL
    pub price: Decimal,
    pub description: Option<String>,
    /// Tracked stock; omit for unlimited
    pub stock: Option<i64>,
}

/// Request body for updating a product; absent fields are left untouched
#[derive(Debug, Deserialize, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub stock: Option<i64>,
}

/// Request body for creating a client
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub cpf: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Request body for updating a client
#[derive(Debug, Deserialize, Default)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
