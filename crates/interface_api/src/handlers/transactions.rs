//! Transaction ledger handlers

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::{ClientId, Money, ProductId, TransactionId};
use domain_access::Actor;
use domain_billing::{NewTransaction, Transaction, TransactionFilter, TransactionSummary};

use crate::dto::billing::{ClientPaymentRequest, CreateTransactionRequest, TransactionQuery};
use crate::error::ApiError;
use crate::AppState;

fn filter_from(query: TransactionQuery) -> TransactionFilter {
    TransactionFilter {
        kind: query.kind,
        method: query.payment_method,
        start_date: query.start_date,
        end_date: query.end_date,
        client_id: None,
    }
}

/// Records an entrada or saída
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction = state
        .ledger
        .record_transaction(
            &actor,
            NewTransaction {
                kind: request.kind,
                amount: Money::brl(request.amount),
                description: request.description,
                method: request.payment_method,
                product_id: request.product_id.map(ProductId::from),
                client_id: request.client_id.map(ClientId::from),
            },
        )
        .await?;
    Ok(Json(transaction))
}

/// Lists transactions, newest first
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    Ok(Json(
        state
            .ledger
            .list_transactions(&actor, &filter_from(query))
            .await?,
    ))
}

/// Dashboard summary of the filtered ledger
pub async fn summary(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<TransactionSummary>, ApiError> {
    Ok(Json(
        state.ledger.summary(&actor, &filter_from(query)).await?,
    ))
}

/// Allocates a client payment to the oldest pending installment
pub async fn client_payment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<ClientPaymentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = state
        .ledger
        .allocate_client_payment(
            &actor,
            ClientId::from(request.client_id),
            ProductId::from(request.product_id),
            request.payment_method,
        )
        .await?;

    Ok(Json(serde_json::json!({
        "transaction": outcome.transaction,
        "installment_paid": outcome.installment.number,
        "amount": outcome.installment.amount,
    })))
}

/// Cancels a transaction (reverting a linked installment when applicable)
pub async fn cancel_transaction(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Transaction>, ApiError> {
    Ok(Json(
        state
            .ledger
            .cancel_transaction(&actor, TransactionId::from(id))
            .await?,
    ))
}

/// Renders the filtered ledger as a downloadable document
pub async fn export_report(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<TransactionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (document, content_type) = state
        .ledger
        .export_report(&actor, &filter_from(query))
        .await?;

    Ok(([(header::CONTENT_TYPE, content_type)], document))
}
