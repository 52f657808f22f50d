//! PostgreSQL adapters for the product and client stores

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ClientId, DomainPort, PortError, ProductId, UserId};
use domain_registry::{Client, ClientStore, Product, ProductStore};

use crate::error::DatabaseError;
use crate::repository::parse_money;

const SELECT_PRODUCT: &str = r#"
    SELECT product_id, code, name, price, currency, description, stock,
           active, created_at, updated_at
    FROM products
"#;

/// Database row for a product
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    product_id: Uuid,
    code: String,
    name: String,
    price: Decimal,
    currency: String,
    description: Option<String>,
    stock: Option<i64>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, DatabaseError> {
        Ok(Product {
            id: ProductId::from(self.product_id),
            code: self.code,
            name: self.name,
            price: parse_money(self.price, &self.currency)?,
            description: self.description,
            stock: self.stock,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// PostgreSQL-backed implementation of [`ProductStore`]
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgProductStore {}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, PortError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} WHERE product_id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(|r| r.into_product().map_err(PortError::from))
            .transpose()
    }

    async fn list_active(&self) -> Result<Vec<Product>, PortError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} WHERE active ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|r| r.into_product().map_err(PortError::from))
            .collect()
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Product>, PortError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} WHERE active AND code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(|r| r.into_product().map_err(PortError::from))
            .transpose()
    }

    async fn find_active_by_name(&self, name: &str) -> Result<Option<Product>, PortError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} WHERE active AND name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(|r| r.into_product().map_err(PortError::from))
            .transpose()
    }

    async fn insert(&self, product: &Product) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                product_id, code, name, price, currency, description, stock,
                active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.price.amount())
        .bind(product.price.currency().code())
        .bind(&product.description)
        .bind(product.stock)
        .bind(product.active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET code = $2, name = $3, price = $4, currency = $5,
                description = $6, stock = $7, active = $8, updated_at = $9
            WHERE product_id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.price.amount())
        .bind(product.price.currency().code())
        .bind(&product.description)
        .bind(product.stock)
        .bind(product.active)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("product", product.id));
        }
        Ok(())
    }

    async fn try_draw_stock(
        &self,
        id: ProductId,
        quantity: i64,
    ) -> Result<Option<Product>, PortError> {
        // The stock test and decrement are one statement, so concurrent
        // sales cannot both take the last unit.
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET stock = CASE WHEN stock IS NULL THEN NULL ELSE stock - $2 END,
                updated_at = NOW()
            WHERE product_id = $1
              AND active
              AND (stock IS NULL OR stock >= $2)
            RETURNING product_id, code, name, price, currency, description,
                      stock, active, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(|r| r.into_product().map_err(PortError::from))
            .transpose()
    }
}

const SELECT_CLIENT: &str = r#"
    SELECT client_id, name, email, cpf, phone, address, created_by,
           created_at, updated_at
    FROM clients
"#;

/// Database row for a client
#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    client_id: Uuid,
    name: String,
    email: String,
    cpf: String,
    phone: Option<String>,
    address: Option<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: ClientId::from(row.client_id),
            name: row.name,
            email: row.email,
            cpf: row.cpf,
            phone: row.phone,
            address: row.address,
            created_by: UserId::from(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed implementation of [`ClientStore`]
#[derive(Debug, Clone)]
pub struct PgClientStore {
    pool: PgPool,
}

impl PgClientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgClientStore {}

#[async_trait]
impl ClientStore for PgClientStore {
    async fn get(&self, id: ClientId) -> Result<Option<Client>, PortError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "{SELECT_CLIENT} WHERE client_id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(row.map(Client::from))
    }

    async fn list(&self) -> Result<Vec<Client>, PortError> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!("{SELECT_CLIENT} ORDER BY name"))
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>, PortError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "{SELECT_CLIENT} WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(row.map(Client::from))
    }

    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Client>, PortError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!("{SELECT_CLIENT} WHERE cpf = $1"))
            .bind(cpf)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        Ok(row.map(Client::from))
    }

    async fn insert(&self, client: &Client) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO clients (
                client_id, name, email, cpf, phone, address, created_by,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.cpf)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(client.created_by.as_uuid())
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    async fn update(&self, client: &Client) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET name = $2, email = $3, phone = $4, address = $5, updated_at = $6
            WHERE client_id = $1
            "#,
        )
        .bind(client.id.as_uuid())
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("client", client.id));
        }
        Ok(())
    }
}
