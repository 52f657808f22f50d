//! Product and client services
//!
//! Same discipline as every service in the workspace: authorize first,
//! validate second, write third, audit last, and only on success.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, instrument};

use core_kernel::{ClientId, Money, ProductId};
use domain_access::{authorize, Action, Actor};
use domain_audit::{ActivityEntry, ActivityKind, AuditLog};

use crate::client::Client;
use crate::error::RegistryError;
use crate::ports::{ClientStore, IdentityValidation, ProductStore};
use crate::product::Product;

/// Request to create a product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub price: Money,
    pub description: Option<String>,
    pub stock: Option<i64>,
}

/// Partial product update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub description: Option<Option<String>>,
    pub stock: Option<Option<i64>>,
}

/// Request to create a client
#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial client update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

/// Application service for the product registry
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductStore>,
    audit: Arc<dyn AuditLog>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductStore>, audit: Arc<dyn AuditLog>) -> Self {
        Self { products, audit }
    }

    /// Creates a product; code and name must be unique among active products
    #[instrument(skip(self, request), fields(actor = %actor.name, code = %request.code))]
    pub async fn create_product(
        &self,
        actor: &Actor,
        request: NewProduct,
    ) -> Result<Product, RegistryError> {
        authorize(actor, &Action::ManageProducts)?;

        let code = request.code.trim();
        let name = request.name.trim();
        if code.is_empty() {
            return Err(RegistryError::validation("product code is required"));
        }
        if name.is_empty() {
            return Err(RegistryError::validation("product name is required"));
        }
        if !request.price.is_positive() {
            return Err(RegistryError::validation("price must be greater than zero"));
        }
        if matches!(request.stock, Some(quantity) if quantity < 0) {
            return Err(RegistryError::validation("stock cannot be negative"));
        }

        if self.products.find_active_by_code(code).await?.is_some() {
            return Err(RegistryError::Conflict(format!(
                "product code already in use: {code}"
            )));
        }
        if self.products.find_active_by_name(name).await?.is_some() {
            return Err(RegistryError::Conflict(format!(
                "product name already in use: {name}"
            )));
        }

        let product = Product::new(code, name, request.price, request.description, request.stock);
        self.products.insert(&product).await?;

        info!(product_id = %product.id, "product created");
        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::ProductCreated,
                format!("Created product {} ({})", product.name, product.code),
                json!({ "product_id": product.id, "price": product.price }),
            ))
            .await?;

        Ok(product)
    }

    /// Updates price, name, description or stock of an active product
    #[instrument(skip(self, update), fields(actor = %actor.name, product = %id))]
    pub async fn update_product(
        &self,
        actor: &Actor,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, RegistryError> {
        authorize(actor, &Action::ManageProducts)?;

        let mut product = self
            .products
            .get(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(id))?;
        if !product.active {
            return Err(RegistryError::business_rule(
                "cannot update an inactive product",
            ));
        }

        if let Some(name) = update.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(RegistryError::validation("product name is required"));
            }
            if name != product.name {
                if let Some(existing) = self.products.find_active_by_name(&name).await? {
                    if existing.id != product.id {
                        return Err(RegistryError::Conflict(format!(
                            "product name already in use: {name}"
                        )));
                    }
                }
                product.name = name;
            }
        }
        if let Some(price) = update.price {
            if !price.is_positive() {
                return Err(RegistryError::validation("price must be greater than zero"));
            }
            product.price = price;
        }
        if let Some(description) = update.description {
            product.description = description;
        }
        if let Some(stock) = update.stock {
            if matches!(stock, Some(quantity) if quantity < 0) {
                return Err(RegistryError::validation("stock cannot be negative"));
            }
            product.stock = stock;
        }
        product.updated_at = chrono::Utc::now();

        self.products.update(&product).await?;

        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::ProductUpdated,
                format!("Updated product {}", product.name),
                json!({ "product_id": product.id, "price": product.price }),
            ))
            .await?;

        Ok(product)
    }

    /// Soft-deletes a product
    #[instrument(skip(self), fields(actor = %actor.name, product = %id))]
    pub async fn deactivate_product(
        &self,
        actor: &Actor,
        id: ProductId,
    ) -> Result<(), RegistryError> {
        authorize(actor, &Action::ManageProducts)?;

        let mut product = self
            .products
            .get(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(id))?;
        if !product.active {
            return Err(RegistryError::business_rule("product is already inactive"));
        }

        product.deactivate();
        self.products.update(&product).await?;

        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::ProductDeactivated,
                format!("Deactivated product {}", product.name),
                json!({ "product_id": product.id }),
            ))
            .await?;

        Ok(())
    }

    /// Lists active products
    pub async fn list_products(&self, actor: &Actor) -> Result<Vec<Product>, RegistryError> {
        authorize(actor, &Action::ViewProducts)?;
        Ok(self.products.list_active().await?)
    }
}

/// Application service for the client registry
#[derive(Clone)]
pub struct ClientService {
    clients: Arc<dyn ClientStore>,
    identity: Arc<dyn IdentityValidation>,
    audit: Arc<dyn AuditLog>,
}

impl ClientService {
    pub fn new(
        clients: Arc<dyn ClientStore>,
        identity: Arc<dyn IdentityValidation>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            clients,
            identity,
            audit,
        }
    }

    /// Registers a client with validated, canonically formatted identity
    #[instrument(skip(self, request), fields(actor = %actor.name, client = %request.name))]
    pub async fn create_client(
        &self,
        actor: &Actor,
        request: NewClient,
    ) -> Result<Client, RegistryError> {
        authorize(actor, &Action::CreateClient)?;

        let name = request.name.trim();
        if name.is_empty() {
            return Err(RegistryError::validation("client name is required"));
        }
        let email = request.email.trim().to_lowercase();
        self.identity.validate_email(&email)?;
        let cpf = self.identity.canonicalize_document(&request.cpf)?;

        if self.clients.find_by_email(&email).await?.is_some() {
            return Err(RegistryError::Conflict(format!(
                "email already registered: {email}"
            )));
        }
        if self.clients.find_by_cpf(&cpf).await?.is_some() {
            return Err(RegistryError::Conflict(format!(
                "CPF already registered: {cpf}"
            )));
        }

        let client = Client::new(
            name,
            email,
            cpf,
            request.phone,
            request.address,
            actor.id,
        );
        self.clients.insert(&client).await?;

        info!(client_id = %client.id, "client created");
        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::ClientCreated,
                format!("Created client {}", client.name),
                json!({ "client_id": client.id, "cpf": client.cpf }),
            ))
            .await?;

        Ok(client)
    }

    /// Updates contact data of a client; CPF is immutable once registered
    #[instrument(skip(self, update), fields(actor = %actor.name, client = %id))]
    pub async fn update_client(
        &self,
        actor: &Actor,
        id: ClientId,
        update: ClientUpdate,
    ) -> Result<Client, RegistryError> {
        authorize(actor, &Action::UpdateClient)?;

        let mut client = self
            .clients
            .get(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(id))?;

        if let Some(name) = update.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(RegistryError::validation("client name is required"));
            }
            client.name = name;
        }
        if let Some(email) = update.email {
            let email = email.trim().to_lowercase();
            self.identity.validate_email(&email)?;
            if email != client.email {
                if let Some(existing) = self.clients.find_by_email(&email).await? {
                    if existing.id != client.id {
                        return Err(RegistryError::Conflict(format!(
                            "email already registered: {email}"
                        )));
                    }
                }
                client.email = email;
            }
        }
        if let Some(phone) = update.phone {
            client.phone = phone;
        }
        if let Some(address) = update.address {
            client.address = address;
        }
        client.updated_at = chrono::Utc::now();

        self.clients.update(&client).await?;

        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::ClientUpdated,
                format!("Updated client {}", client.name),
                json!({ "client_id": client.id }),
            ))
            .await?;

        Ok(client)
    }

    /// Lists all clients
    pub async fn list_clients(&self, actor: &Actor) -> Result<Vec<Client>, RegistryError> {
        authorize(actor, &Action::ViewClients)?;
        Ok(self.clients.list().await?)
    }

    /// Fetches one client
    pub async fn get_client(&self, actor: &Actor, id: ClientId) -> Result<Client, RegistryError> {
        authorize(actor, &Action::ViewClients)?;
        self.clients
            .get(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(id))
    }
}
