//! Billing domain ports
//!
//! Every status transition is a *conditional* operation in the port
//! contract: "mark paid where still pending", "cancel where not yet
//! cancelled". Implementations must apply the state test and the write
//! atomically (a conditional UPDATE in Postgres, a mutex-guarded check in
//! the in-memory double), which closes the check-then-act race between two
//! concurrent attempts on the same row. A `None` return means no row
//! matched the precondition; the caller disambiguates missing vs
//! wrong-state with a follow-up read, which is race-free because it only
//! ever feeds an error message.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{BillId, DomainPort, InstallmentId, PortError, TransactionId, UserId};

use crate::bill::{Bill, Installment, PendingFilter, PendingInstallmentRow};
use crate::ledger::{PaymentMethod, Transaction, TransactionFilter};
use crate::sale::Sale;

/// Store for bills and their installments
#[async_trait]
pub trait BillStore: DomainPort {
    /// Persists a bill together with all of its installments, atomically.
    ///
    /// Either everything lands or nothing does; a bill must never exist
    /// with a partial schedule.
    async fn insert_bill(
        &self,
        bill: &Bill,
        installments: &[Installment],
    ) -> Result<(), PortError>;

    /// Fetches a bill by id
    async fn get_bill(&self, id: BillId) -> Result<Option<Bill>, PortError>;

    /// Lists all bills, newest first
    async fn list_bills(&self) -> Result<Vec<Bill>, PortError>;

    /// Fetches an installment by id
    async fn get_installment(&self, id: InstallmentId) -> Result<Option<Installment>, PortError>;

    /// Lists a bill's installments ordered by sequence number
    async fn installments_for_bill(&self, bill_id: BillId)
        -> Result<Vec<Installment>, PortError>;

    /// Cross-bill pending query: pending installments of non-cancelled
    /// bills, enriched with client/product context, due date ascending
    async fn find_pending(
        &self,
        filter: &PendingFilter,
    ) -> Result<Vec<PendingInstallmentRow>, PortError>;

    /// Conditional Pending → Paid. Returns the updated installment, or
    /// `None` when it is missing or no longer pending.
    async fn try_mark_installment_paid(
        &self,
        id: InstallmentId,
        by: UserId,
        method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Result<Option<Installment>, PortError>;

    /// Conditional Paid → Pending (payment reversal), clearing payment
    /// metadata. Returns `None` when missing or not currently paid.
    async fn try_revert_installment(
        &self,
        id: InstallmentId,
    ) -> Result<Option<Installment>, PortError>;

    /// Conditionally cancels a bill and cascades cancellation to every one
    /// of its installments regardless of status. Returns the updated bill
    /// and installments, or `None` when missing or already cancelled.
    async fn try_cancel_bill(
        &self,
        id: BillId,
        by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<(Bill, Vec<Installment>)>, PortError>;

    /// Pays every pending installment of a non-cancelled bill in one
    /// logical operation. Returns the installments that flipped to paid
    /// (possibly empty), or `None` when the bill is missing or cancelled.
    async fn try_pay_all(
        &self,
        bill_id: BillId,
        by: UserId,
        method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Result<Option<Vec<Installment>>, PortError>;
}

/// Store for ledger transactions
#[async_trait]
pub trait LedgerStore: DomainPort {
    /// Appends a transaction
    async fn insert(&self, transaction: &Transaction) -> Result<(), PortError>;

    /// Fetches a transaction by id
    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, PortError>;

    /// Lists transactions matching the filter, newest first
    async fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, PortError>;

    /// Conditional active → cancelled. Returns the updated transaction, or
    /// `None` when missing or already cancelled.
    async fn try_cancel(
        &self,
        id: TransactionId,
        by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<Transaction>, PortError>;
}

/// Store for sales records
#[async_trait]
pub trait SaleStore: DomainPort {
    /// Appends a sale
    async fn insert(&self, sale: &Sale) -> Result<(), PortError>;

    /// Lists all sales, newest first
    async fn list(&self) -> Result<Vec<Sale>, PortError>;

    /// Lists one seller's sales, newest first
    async fn list_by_seller(&self, seller_id: UserId) -> Result<Vec<Sale>, PortError>;
}
