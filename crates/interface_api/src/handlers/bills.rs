//! Bill and installment handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use core_kernel::{BillId, ClientId, InstallmentId, Money, ProductId};
use domain_access::Actor;
use domain_billing::{Bill, Installment, NewBill, PendingFilter};

use crate::dto::billing::{
    BillResponse, CreateBillRequest, PayAllResponse, PayRequest, PendingQuery, PendingResponse,
};
use crate::error::ApiError;
use crate::AppState;

/// Creates a bill with its installment schedule
pub async fn create_bill(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateBillRequest>,
) -> Result<Json<BillResponse>, ApiError> {
    let created = state
        .billing
        .create_bill(
            &actor,
            NewBill {
                client_id: ClientId::from(request.client_id),
                product_id: request.product_id.map(ProductId::from),
                description: request.description,
                total_amount: request.total_amount.map(Money::brl),
                installments: request.installments,
            },
        )
        .await?;
    Ok(Json(BillResponse {
        bill: created.bill,
        installments: created.installments,
    }))
}

/// Lists all bills
pub async fn list_bills(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Bill>>, ApiError> {
    Ok(Json(state.billing.list_bills(&actor).await?))
}

/// Lists a bill's installments by sequence number
pub async fn bill_installments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Installment>>, ApiError> {
    Ok(Json(
        state
            .billing
            .bill_installments(&actor, BillId::from(id))
            .await?,
    ))
}

/// Cancels a bill, cascading to all installments
pub async fn cancel_bill(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Bill>, ApiError> {
    Ok(Json(
        state.billing.cancel_bill(&actor, BillId::from(id)).await?,
    ))
}

/// Pays every pending installment of a bill
pub async fn pay_all(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<PayRequest>,
) -> Result<Json<PayAllResponse>, ApiError> {
    let outcome = state
        .billing
        .pay_all_installments(&actor, BillId::from(id), request.payment_method)
        .await?;
    Ok(Json(PayAllResponse {
        count: outcome.count,
        total: outcome.total,
        installments: outcome.installments,
    }))
}

/// Pays one pending installment
pub async fn pay_installment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<PayRequest>,
) -> Result<Json<Installment>, ApiError> {
    Ok(Json(
        state
            .billing
            .pay_installment(&actor, InstallmentId::from(id), request.payment_method)
            .await?,
    ))
}

/// Reverts a paid installment to pending
pub async fn cancel_installment_payment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Installment>, ApiError> {
    Ok(Json(
        state
            .billing
            .cancel_installment_payment(&actor, InstallmentId::from(id))
            .await?,
    ))
}

/// Cross-bill pending installments with optional overdue/month/year/client
/// filters
pub async fn pending_installments(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<Vec<PendingResponse>>, ApiError> {
    let filter = PendingFilter {
        client_id: None,
        product_id: None,
        overdue_only: query.overdue,
        month: query.month,
        year: query.year,
        client_name: query.client_name,
    };
    let rows = state.billing.pending_installments(&actor, &filter).await?;

    let now = Utc::now();
    Ok(Json(
        rows.into_iter()
            .map(|row| PendingResponse::from_row(row, now))
            .collect(),
    ))
}
