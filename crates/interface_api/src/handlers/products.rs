//! Product handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Money, ProductId};
use domain_access::Actor;
use domain_registry::{NewProduct, Product, ProductUpdate};

use crate::dto::registry::{CreateProductRequest, UpdateProductRequest};
use crate::error::ApiError;
use crate::AppState;

/// Creates a product
pub async fn create_product(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let product = state
        .products
        .create_product(
            &actor,
            NewProduct {
                code: request.code,
                name: request.name,
                price: Money::brl(request.price),
                description: request.description,
                stock: request.stock,
            },
        )
        .await?;
    Ok(Json(product))
}

/// Lists active products
pub async fn list_products(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.products.list_products(&actor).await?))
}

/// Updates a product
pub async fn update_product(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .products
        .update_product(
            &actor,
            ProductId::from(id),
            ProductUpdate {
                name: request.name,
                price: request.price.map(Money::brl),
                description: request.description.map(Some),
                stock: request.stock.map(Some),
            },
        )
        .await?;
    Ok(Json(product))
}

/// Soft-deletes a product
pub async fn deactivate_product(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state
        .products
        .deactivate_product(&actor, ProductId::from(id))
        .await?;
    Ok(Json(json!({ "message": "product deactivated" })))
}
