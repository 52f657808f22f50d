//! Billing, ledger and sales services
//!
//! All operations follow the same order: authorize against the permission
//! matrix, validate input, execute through conditional store operations,
//! then append exactly one audit entry. Nothing is written when any step
//! fails, and multi-entity writes (bill + installments) are atomic in the
//! store port.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument, warn};

use core_kernel::{BillId, ClientId, Currency, InstallmentId, Money, ProductId, TransactionId};
use domain_access::{authorize, Action, Actor};
use domain_audit::{ActivityEntry, ActivityKind, AuditLog};
use domain_registry::{ClientStore, ProductStore};

use crate::allocation::allocation_order;
use crate::bill::{Bill, Installment, InstallmentStatus, PendingFilter, PendingInstallmentRow};
use crate::error::BillingError;
use crate::ledger::{
    PaymentMethod, Transaction, TransactionFilter, TransactionKind, TransactionSummary,
};
use crate::ports::{BillStore, LedgerStore, SaleStore};
use crate::report::ReportRenderer;
use crate::sale::{Sale, SaleReport};

/// Request to create a bill
#[derive(Debug, Clone)]
pub struct NewBill {
    pub client_id: ClientId,
    /// When set, the product's current price overrides `total_amount`
    pub product_id: Option<ProductId>,
    pub description: String,
    /// Mandatory when no product is given
    pub total_amount: Option<Money>,
    pub installments: u32,
}

/// A bill together with its freshly created installments
#[derive(Debug, Clone)]
pub struct CreatedBill {
    pub bill: Bill,
    pub installments: Vec<Installment>,
}

/// Result of paying every pending installment of a bill
#[derive(Debug, Clone)]
pub struct PayAllOutcome {
    pub count: usize,
    pub total: Money,
    pub installments: Vec<Installment>,
}

/// Request to record a plain entrada/saída transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Money,
    pub description: String,
    pub method: PaymentMethod,
    pub product_id: Option<ProductId>,
    pub client_id: Option<ClientId>,
}

/// Result of allocating a client payment
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub transaction: Transaction,
    pub installment: Installment,
}

/// Request to record a sale
#[derive(Debug, Clone)]
pub struct NewSale {
    pub product_id: ProductId,
    pub client_id: Option<ClientId>,
    pub quantity: u32,
    pub method: PaymentMethod,
}

/// Application service for bills and installments
#[derive(Clone)]
pub struct BillingService {
    bills: Arc<dyn BillStore>,
    products: Arc<dyn ProductStore>,
    clients: Arc<dyn ClientStore>,
    audit: Arc<dyn AuditLog>,
}

impl BillingService {
    pub fn new(
        bills: Arc<dyn BillStore>,
        products: Arc<dyn ProductStore>,
        clients: Arc<dyn ClientStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            bills,
            products,
            clients,
            audit,
        }
    }

    /// Creates a bill with its installment schedule, all-or-nothing.
    ///
    /// With a product, the product's current price is the total; any
    /// supplied amount is ignored. Without one, `total_amount` is
    /// mandatory.
    #[instrument(skip(self, request), fields(actor = %actor.name, client = %request.client_id))]
    pub async fn create_bill(
        &self,
        actor: &Actor,
        request: NewBill,
    ) -> Result<CreatedBill, BillingError> {
        authorize(actor, &Action::ManageBills)?;

        if request.installments < 1 {
            return Err(BillingError::validation(
                "installment count must be at least 1",
            ));
        }
        let description = request.description.trim().to_string();
        if description.is_empty() {
            return Err(BillingError::validation("description is required"));
        }

        let client = self
            .clients
            .get(request.client_id)
            .await?
            .ok_or_else(|| BillingError::not_found(request.client_id))?;

        let (total, product_name) = match request.product_id {
            Some(product_id) => {
                let product = self
                    .products
                    .get(product_id)
                    .await?
                    .ok_or_else(|| BillingError::not_found(product_id))?;
                if !product.active {
                    return Err(BillingError::business_rule(
                        "cannot bill an inactive product",
                    ));
                }
                (product.price, Some(product.name))
            }
            None => {
                let total = request.total_amount.ok_or_else(|| {
                    BillingError::validation(
                        "either a product or a total amount must be provided",
                    )
                })?;
                (total, None)
            }
        };
        if !total.is_positive() {
            return Err(BillingError::validation(
                "total amount must be greater than zero",
            ));
        }

        let bill = Bill::new(
            request.client_id,
            request.product_id,
            description,
            total,
            request.installments,
            actor.id,
        );
        let installments = bill.installment_schedule()?;
        self.bills.insert_bill(&bill, &installments).await?;

        info!(bill_id = %bill.id, total = %bill.total, count = bill.installment_count, "bill created");
        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::BillCreated,
                format!(
                    "Created bill for {} ({} installments of ~{})",
                    client.name,
                    bill.installment_count,
                    installments[0].amount
                ),
                json!({
                    "bill_id": bill.id,
                    "client_id": client.id,
                    "client_name": client.name,
                    "product_name": product_name,
                    "total": bill.total,
                    "installments": bill.installment_count,
                }),
            ))
            .await?;

        Ok(CreatedBill { bill, installments })
    }

    /// Cancels a bill, cascading to every installment regardless of status.
    ///
    /// Already-paid installments become cancelled too; their linked
    /// transactions stay untouched (reversal is an explicit, separate
    /// action on the transaction).
    #[instrument(skip(self), fields(actor = %actor.name, bill = %bill_id))]
    pub async fn cancel_bill(&self, actor: &Actor, bill_id: BillId) -> Result<Bill, BillingError> {
        authorize(actor, &Action::ManageBills)?;

        let now = Utc::now();
        match self.bills.try_cancel_bill(bill_id, actor.id, now).await? {
            Some((bill, installments)) => {
                self.audit
                    .record(ActivityEntry::new(
                        actor.id,
                        actor.name.clone(),
                        ActivityKind::BillCancelled,
                        format!(
                            "Cancelled bill {} and its {} installments",
                            bill.id,
                            installments.len()
                        ),
                        json!({ "bill_id": bill.id, "installments": installments.len() }),
                    ))
                    .await?;
                Ok(bill)
            }
            None => match self.bills.get_bill(bill_id).await? {
                None => Err(BillingError::not_found(bill_id)),
                Some(_) => Err(BillingError::business_rule("bill is already cancelled")),
            },
        }
    }

    /// Pays one pending installment.
    ///
    /// The pending-only precondition rides the conditional store update, so
    /// the same rule holds on this path, on pay-all and on allocation.
    #[instrument(skip(self), fields(actor = %actor.name, installment = %installment_id))]
    pub async fn pay_installment(
        &self,
        actor: &Actor,
        installment_id: InstallmentId,
        method: PaymentMethod,
    ) -> Result<Installment, BillingError> {
        authorize(actor, &Action::ManageBills)?;

        let now = Utc::now();
        match self
            .bills
            .try_mark_installment_paid(installment_id, actor.id, method, now)
            .await?
        {
            Some(installment) => {
                self.audit
                    .record(ActivityEntry::new(
                        actor.id,
                        actor.name.clone(),
                        ActivityKind::InstallmentPaid,
                        format!(
                            "Paid installment {} of bill {} ({})",
                            installment.number, installment.bill_id, installment.amount
                        ),
                        json!({
                            "installment_id": installment.id,
                            "bill_id": installment.bill_id,
                            "number": installment.number,
                            "amount": installment.amount,
                            "method": method,
                        }),
                    ))
                    .await?;
                Ok(installment)
            }
            None => Err(self.explain_unpayable(installment_id).await?),
        }
    }

    /// Pays every pending installment of a bill in one logical operation
    #[instrument(skip(self), fields(actor = %actor.name, bill = %bill_id))]
    pub async fn pay_all_installments(
        &self,
        actor: &Actor,
        bill_id: BillId,
        method: PaymentMethod,
    ) -> Result<PayAllOutcome, BillingError> {
        authorize(actor, &Action::ManageBills)?;

        let now = Utc::now();
        let paid = match self.bills.try_pay_all(bill_id, actor.id, method, now).await? {
            Some(paid) => paid,
            None => {
                return match self.bills.get_bill(bill_id).await? {
                    None => Err(BillingError::not_found(bill_id)),
                    Some(_) => Err(BillingError::business_rule("bill is cancelled")),
                }
            }
        };
        if paid.is_empty() {
            return Err(BillingError::business_rule(
                "bill has no pending installments",
            ));
        }

        let total = paid
            .iter()
            .fold(Money::zero(Currency::BRL), |acc, i| acc + i.amount);
        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::InstallmentsPaidAll,
                format!(
                    "Paid {} installments of bill {bill_id} totalling {total}",
                    paid.len()
                ),
                json!({
                    "bill_id": bill_id,
                    "count": paid.len(),
                    "total": total,
                    "method": method,
                }),
            ))
            .await?;

        Ok(PayAllOutcome {
            count: paid.len(),
            total,
            installments: paid,
        })
    }

    /// Reverts a paid installment to pending, clearing payment metadata
    #[instrument(skip(self), fields(actor = %actor.name, installment = %installment_id))]
    pub async fn cancel_installment_payment(
        &self,
        actor: &Actor,
        installment_id: InstallmentId,
    ) -> Result<Installment, BillingError> {
        authorize(actor, &Action::ManageBills)?;

        match self.bills.try_revert_installment(installment_id).await? {
            Some(installment) => {
                self.audit
                    .record(ActivityEntry::new(
                        actor.id,
                        actor.name.clone(),
                        ActivityKind::InstallmentPaymentCancelled,
                        format!(
                            "Reverted payment of installment {} of bill {}",
                            installment.number, installment.bill_id
                        ),
                        json!({
                            "installment_id": installment.id,
                            "bill_id": installment.bill_id,
                        }),
                    ))
                    .await?;
                Ok(installment)
            }
            None => match self.bills.get_installment(installment_id).await? {
                None => Err(BillingError::not_found(installment_id)),
                Some(_) => Err(BillingError::business_rule("installment is not paid")),
            },
        }
    }

    /// Lists a bill's installments by sequence number
    pub async fn bill_installments(
        &self,
        actor: &Actor,
        bill_id: BillId,
    ) -> Result<Vec<Installment>, BillingError> {
        authorize(actor, &Action::ViewBills)?;

        if self.bills.get_bill(bill_id).await?.is_none() {
            return Err(BillingError::not_found(bill_id));
        }
        Ok(self.bills.installments_for_bill(bill_id).await?)
    }

    /// Lists all bills, newest first
    pub async fn list_bills(&self, actor: &Actor) -> Result<Vec<Bill>, BillingError> {
        authorize(actor, &Action::ViewBills)?;
        Ok(self.bills.list_bills().await?)
    }

    /// Cross-bill pending installment view with client/product context
    pub async fn pending_installments(
        &self,
        actor: &Actor,
        filter: &PendingFilter,
    ) -> Result<Vec<PendingInstallmentRow>, BillingError> {
        authorize(actor, &Action::ViewBills)?;
        Ok(self.bills.find_pending(filter).await?)
    }

    /// Turns a failed conditional payment into the precise error
    async fn explain_unpayable(
        &self,
        installment_id: InstallmentId,
    ) -> Result<BillingError, BillingError> {
        Ok(match self.bills.get_installment(installment_id).await? {
            None => BillingError::not_found(installment_id),
            Some(installment) => match installment.status {
                InstallmentStatus::Paid => {
                    BillingError::business_rule("installment is already paid")
                }
                InstallmentStatus::Cancelled => {
                    BillingError::business_rule("installment is cancelled")
                }
                // Lost a race and the row is pending again: report it as a
                // transient conflict rather than lying about the status.
                InstallmentStatus::Pending => {
                    BillingError::business_rule("installment could not be paid, try again")
                }
            },
        })
    }
}

/// Application service for the transaction ledger and payment allocation
#[derive(Clone)]
pub struct LedgerService {
    ledger: Arc<dyn LedgerStore>,
    bills: Arc<dyn BillStore>,
    clients: Arc<dyn ClientStore>,
    products: Arc<dyn ProductStore>,
    audit: Arc<dyn AuditLog>,
    renderer: Arc<dyn ReportRenderer>,
}

impl LedgerService {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        bills: Arc<dyn BillStore>,
        clients: Arc<dyn ClientStore>,
        products: Arc<dyn ProductStore>,
        audit: Arc<dyn AuditLog>,
        renderer: Arc<dyn ReportRenderer>,
    ) -> Self {
        Self {
            ledger,
            bills,
            clients,
            products,
            audit,
            renderer,
        }
    }

    /// Records an entrada or saída.
    ///
    /// Client payments are not recorded here; they only exist as the
    /// output of [`Self::allocate_client_payment`], which is what ties them
    /// to an installment.
    #[instrument(skip(self, request), fields(actor = %actor.name, kind = %request.kind))]
    pub async fn record_transaction(
        &self,
        actor: &Actor,
        request: NewTransaction,
    ) -> Result<Transaction, BillingError> {
        authorize(actor, &Action::RecordCashTransaction)?;

        if request.kind == TransactionKind::PagamentoCliente {
            return Err(BillingError::validation(
                "client payments are recorded through allocation",
            ));
        }
        if !request.amount.is_positive() {
            return Err(BillingError::validation(
                "amount must be greater than zero",
            ));
        }
        let description = request.description.trim().to_string();
        if description.is_empty() {
            return Err(BillingError::validation("description is required"));
        }
        if !request.kind.allows_method(request.method) {
            return Err(BillingError::business_rule(
                "expenses accept only cash or instant transfer",
            ));
        }

        let transaction = Transaction::new(
            request.kind,
            request.amount,
            description,
            request.method,
            request.product_id,
            request.client_id,
            None,
            actor.id,
        );
        self.ledger.insert(&transaction).await?;

        info!(transaction_id = %transaction.id, amount = %transaction.amount, "transaction recorded");
        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::TransactionRecorded,
                format!(
                    "Recorded {} of {} ({})",
                    transaction.kind, transaction.amount, transaction.method
                ),
                json!({
                    "transaction_id": transaction.id,
                    "kind": transaction.kind,
                    "amount": transaction.amount,
                    "method": transaction.method,
                }),
            ))
            .await?;

        Ok(transaction)
    }

    /// Cancels a transaction; for client payments this also reverts the
    /// settled installment back to pending, the compensating inverse of
    /// allocation.
    #[instrument(skip(self), fields(actor = %actor.name, transaction = %transaction_id))]
    pub async fn cancel_transaction(
        &self,
        actor: &Actor,
        transaction_id: TransactionId,
    ) -> Result<Transaction, BillingError> {
        authorize(actor, &Action::CancelTransaction)?;

        let now = Utc::now();
        let transaction = match self.ledger.try_cancel(transaction_id, actor.id, now).await? {
            Some(transaction) => transaction,
            None => {
                return match self.ledger.get(transaction_id).await? {
                    None => Err(BillingError::not_found(transaction_id)),
                    Some(_) => Err(BillingError::business_rule(
                        "transaction is already cancelled",
                    )),
                }
            }
        };

        if transaction.kind == TransactionKind::PagamentoCliente {
            if let Some(installment_id) = transaction.installment_id {
                if self
                    .bills
                    .try_revert_installment(installment_id)
                    .await?
                    .is_none()
                {
                    // The installment moved on (e.g. its bill was cancelled
                    // in the meantime); the ledger cancellation stands.
                    warn!(%installment_id, "cancelled client payment but installment was not paid");
                }
            }
        }

        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::TransactionCancelled,
                format!(
                    "Cancelled {} of {}",
                    transaction.kind, transaction.amount
                ),
                json!({
                    "transaction_id": transaction.id,
                    "kind": transaction.kind,
                    "amount": transaction.amount,
                    "installment_id": transaction.installment_id,
                }),
            ))
            .await?;

        Ok(transaction)
    }

    /// Settles the oldest pending installment of a client/product pair.
    ///
    /// The allocation decides the amount: it is the installment's, never a
    /// caller-supplied figure.
    #[instrument(skip(self), fields(actor = %actor.name, client = %client_id, product = %product_id))]
    pub async fn allocate_client_payment(
        &self,
        actor: &Actor,
        client_id: ClientId,
        product_id: ProductId,
        method: PaymentMethod,
    ) -> Result<AllocationOutcome, BillingError> {
        authorize(actor, &Action::RecordCashTransaction)?;

        let client = self
            .clients
            .get(client_id)
            .await?
            .ok_or_else(|| BillingError::not_found(client_id))?;
        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or_else(|| BillingError::not_found(product_id))?;

        let filter = PendingFilter {
            client_id: Some(client_id),
            product_id: Some(product_id),
            ..Default::default()
        };
        let candidates = allocation_order(self.bills.find_pending(&filter).await?);
        if candidates.is_empty() {
            return Err(BillingError::business_rule(
                "no pending installment for this client and product",
            ));
        }

        // Walk the ordered candidates; the conditional update loses only to
        // a concurrent payment of the same row, in which case the next
        // oldest installment is the correct target.
        let now = Utc::now();
        let mut paid: Option<Installment> = None;
        for candidate in &candidates {
            if let Some(installment) = self
                .bills
                .try_mark_installment_paid(candidate.installment.id, actor.id, method, now)
                .await?
            {
                paid = Some(installment);
                break;
            }
        }
        let installment = paid.ok_or_else(|| {
            BillingError::business_rule("no pending installment for this client and product")
        })?;

        let transaction = Transaction::new(
            TransactionKind::PagamentoCliente,
            installment.amount,
            format!(
                "Client payment {} - {} (installment {})",
                client.name, product.name, installment.number
            ),
            method,
            Some(product_id),
            Some(client_id),
            Some(installment.id),
            actor.id,
        );
        self.ledger.insert(&transaction).await?;

        info!(
            installment_id = %installment.id,
            amount = %installment.amount,
            "client payment allocated"
        );
        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::ClientPaymentAllocated,
                format!(
                    "Allocated client payment of {} from {} for {} (installment {})",
                    installment.amount, client.name, product.name, installment.number
                ),
                json!({
                    "client_id": client.id,
                    "client_name": client.name,
                    "product_id": product.id,
                    "product_name": product.name,
                    "installment_id": installment.id,
                    "installment_number": installment.number,
                    "amount": installment.amount,
                    "transaction_id": transaction.id,
                }),
            ))
            .await?;

        Ok(AllocationOutcome {
            transaction,
            installment,
        })
    }

    /// Lists transactions matching the filter, newest first
    pub async fn list_transactions(
        &self,
        actor: &Actor,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, BillingError> {
        authorize(actor, &Action::ViewTransactions)?;
        Ok(self.ledger.list(filter).await?)
    }

    /// Aggregates the filtered ledger into dashboard numbers
    pub async fn summary(
        &self,
        actor: &Actor,
        filter: &TransactionFilter,
    ) -> Result<TransactionSummary, BillingError> {
        authorize(actor, &Action::ViewTransactions)?;
        let transactions = self.ledger.list(filter).await?;
        Ok(TransactionSummary::of(transactions.iter()))
    }

    /// Renders the filtered ledger through the report renderer collaborator
    pub async fn export_report(
        &self,
        actor: &Actor,
        filter: &TransactionFilter,
    ) -> Result<(Vec<u8>, &'static str), BillingError> {
        authorize(actor, &Action::ViewReports)?;

        let rows = self.ledger.list(filter).await?;
        let summary = TransactionSummary::of(rows.iter());
        let document = self.renderer.render(&summary, &rows)?;
        Ok((document, self.renderer.content_type()))
    }
}

/// Application service for sales records
#[derive(Clone)]
pub struct SaleService {
    sales: Arc<dyn SaleStore>,
    products: Arc<dyn ProductStore>,
    audit: Arc<dyn AuditLog>,
}

impl SaleService {
    pub fn new(
        sales: Arc<dyn SaleStore>,
        products: Arc<dyn ProductStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            sales,
            products,
            audit,
        }
    }

    /// Records a sale, drawing tracked stock atomically
    #[instrument(skip(self, request), fields(actor = %actor.name, product = %request.product_id))]
    pub async fn record_sale(&self, actor: &Actor, request: NewSale) -> Result<Sale, BillingError> {
        authorize(actor, &Action::RecordSale)?;

        if request.quantity < 1 {
            return Err(BillingError::validation("quantity must be at least 1"));
        }

        let product = match self
            .products
            .try_draw_stock(request.product_id, request.quantity as i64)
            .await?
        {
            Some(product) => product,
            None => {
                return match self.products.get(request.product_id).await? {
                    None => Err(BillingError::not_found(request.product_id)),
                    Some(product) if !product.active => {
                        Err(BillingError::business_rule("product is inactive"))
                    }
                    Some(_) => Err(BillingError::business_rule("insufficient stock")),
                }
            }
        };

        let sale = Sale::new(
            actor.id,
            actor.name.clone(),
            product.id,
            product.name.clone(),
            request.client_id,
            request.quantity,
            product.price,
            request.method,
        );
        self.sales.insert(&sale).await?;

        info!(sale_id = %sale.id, total = %sale.total, "sale recorded");
        self.audit
            .record(ActivityEntry::new(
                actor.id,
                actor.name.clone(),
                ActivityKind::SaleRecorded,
                format!(
                    "Sold {} x {} for {}",
                    sale.quantity, sale.product_name, sale.total
                ),
                json!({
                    "sale_id": sale.id,
                    "product_id": sale.product_id,
                    "quantity": sale.quantity,
                    "total": sale.total,
                }),
            ))
            .await?;

        Ok(sale)
    }

    /// All sales, for managers and administrators
    pub async fn list_sales(&self, actor: &Actor) -> Result<Vec<Sale>, BillingError> {
        authorize(actor, &Action::ViewReports)?;
        Ok(self.sales.list().await?)
    }

    /// The caller's own sales report ("Meus Relatórios")
    pub async fn my_reports(&self, actor: &Actor) -> Result<SaleReport, BillingError> {
        authorize(actor, &Action::ViewOwnSales)?;
        let sales = self.sales.list_by_seller(actor.id).await?;
        Ok(SaleReport::of(sales))
    }
}
