//! Registry domain ports

use async_trait::async_trait;

use core_kernel::{ClientId, DomainPort, PortError, ProductId};

use crate::client::Client;
use crate::error::RegistryError;
use crate::product::Product;

/// Store for products
#[async_trait]
pub trait ProductStore: DomainPort {
    /// Fetches a product by id (active or not)
    async fn get(&self, id: ProductId) -> Result<Option<Product>, PortError>;

    /// Lists active products, name order
    async fn list_active(&self) -> Result<Vec<Product>, PortError>;

    /// Finds an active product by its code
    async fn find_active_by_code(&self, code: &str) -> Result<Option<Product>, PortError>;

    /// Finds an active product by its name
    async fn find_active_by_name(&self, name: &str) -> Result<Option<Product>, PortError>;

    /// Inserts a new product
    async fn insert(&self, product: &Product) -> Result<(), PortError>;

    /// Persists changes to an existing product
    async fn update(&self, product: &Product) -> Result<(), PortError>;

    /// Atomically draws `quantity` units of stock.
    ///
    /// Returns the updated product when the draw succeeded (unlimited stock
    /// counts as success), or `None` when the product is missing, inactive
    /// or short of stock. The test and the write happen as one operation,
    /// so two concurrent sales cannot both take the last unit.
    async fn try_draw_stock(
        &self,
        id: ProductId,
        quantity: i64,
    ) -> Result<Option<Product>, PortError>;
}

/// Store for clients
#[async_trait]
pub trait ClientStore: DomainPort {
    /// Fetches a client by id
    async fn get(&self, id: ClientId) -> Result<Option<Client>, PortError>;

    /// Lists all clients, name order
    async fn list(&self) -> Result<Vec<Client>, PortError>;

    /// Finds a client by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<Client>, PortError>;

    /// Finds a client by canonical CPF
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Client>, PortError>;

    /// Inserts a new client
    async fn insert(&self, client: &Client) -> Result<(), PortError>;

    /// Persists changes to an existing client
    async fn update(&self, client: &Client) -> Result<(), PortError>;
}

/// Identity validation collaborator (email syntax, national documents)
///
/// The core treats the concrete rules as a black box; the default Brazilian
/// adapter lives in [`crate::validation`].
pub trait IdentityValidation: Send + Sync {
    /// Validates email syntax
    fn validate_email(&self, email: &str) -> Result<(), RegistryError>;

    /// Validates a national identity number and returns its canonical form
    fn canonicalize_document(&self, document: &str) -> Result<String, RegistryError>;
}
