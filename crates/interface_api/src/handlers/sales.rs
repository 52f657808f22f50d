//! Sales handlers

use axum::{extract::State, Extension, Json};

use core_kernel::{ClientId, ProductId};
use domain_access::Actor;
use domain_billing::{NewSale, Sale, SaleReport};

use crate::dto::billing::CreateSaleRequest;
use crate::error::ApiError;
use crate::AppState;

/// Records a sale for the calling salesperson
pub async fn create_sale(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateSaleRequest>,
) -> Result<Json<Sale>, ApiError> {
    let sale = state
        .sales
        .record_sale(
            &actor,
            NewSale {
                product_id: ProductId::from(request.product_id),
                client_id: request.client_id.map(ClientId::from),
                quantity: request.quantity,
                method: request.payment_method,
            },
        )
        .await?;
    Ok(Json(sale))
}

/// Lists every sale (managers and administrators)
pub async fn list_sales(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    Ok(Json(state.sales.list_sales(&actor).await?))
}

/// The caller's own sales report
pub async fn my_reports(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<SaleReport>, ApiError> {
    Ok(Json(state.sales.my_reports(&actor).await?))
}
