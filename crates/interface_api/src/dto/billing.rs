//! Bill, transaction and sale DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_billing::{
    Bill, Installment, PaymentMethod, PendingInstallmentRow, TransactionKind,
};

/// Request body for creating a bill
#[derive(Debug, Deserialize)]
pub struct CreateBillRequest {
    pub client_id: Uuid,
    /// When present, the product's current price becomes the bill total
    pub product_id: Option<Uuid>,
    pub description: String,
    /// Mandatory when no product is given; BRL
    pub total_amount: Option<Decimal>,
    pub installments: u32,
}

/// Request body for paying one or all installments
#[derive(Debug, Deserialize)]
pub struct PayRequest {
    pub payment_method: PaymentMethod,
}

/// Request body for recording a transaction
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub product_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

/// Request body for allocating a client payment
#[derive(Debug, Deserialize)]
pub struct ClientPaymentRequest {
    pub client_id: Uuid,
    pub product_id: Uuid,
    pub payment_method: PaymentMethod,
}

/// Request body for recording a sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub product_id: Uuid,
    pub client_id: Option<Uuid>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub payment_method: PaymentMethod,
}

fn default_quantity() -> u32 {
    1
}

/// Query parameters for the cross-bill pending installment listing
#[derive(Debug, Deserialize, Default)]
pub struct PendingQuery {
    #[serde(default)]
    pub overdue: bool,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub client_name: Option<String>,
}

/// Query parameters for transaction listings and reports
#[derive(Debug, Deserialize, Default)]
pub struct TransactionQuery {
    #[serde(rename = "transaction_type")]
    pub kind: Option<TransactionKind>,
    pub payment_method: Option<PaymentMethod>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Query parameters for the activity log
#[derive(Debug, Deserialize, Default)]
pub struct ActivityLogQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub user_name: Option<String>,
    pub activity_type: Option<String>,
}

/// Bill plus its installments, returned from creation
#[derive(Debug, Serialize)]
pub struct BillResponse {
    #[serde(flatten)]
    pub bill: Bill,
    pub installments: Vec<Installment>,
}

/// One row of the pending-installment view
#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub installment: Installment,
    pub bill_id: core_kernel::BillId,
    pub bill_description: String,
    pub client_name: String,
    pub product_name: Option<String>,
    pub overdue: bool,
}

impl PendingResponse {
    pub fn from_row(row: PendingInstallmentRow, now: DateTime<Utc>) -> Self {
        let overdue = row.installment.is_overdue(now);
        Self {
            overdue,
            bill_id: row.bill.id,
            bill_description: row.bill.description,
            client_name: row.client_name,
            product_name: row.product_name,
            installment: row.installment,
        }
    }
}

/// Outcome of a pay-all operation
#[derive(Debug, Serialize)]
pub struct PayAllResponse {
    pub count: usize,
    pub total: core_kernel::Money,
    pub installments: Vec<Installment>,
}
