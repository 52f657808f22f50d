//! Billing Domain - Bills, Installments, Allocation and the Ledger
//!
//! The stateful heart of the back office:
//!
//! - [`bill`]: the Bill/Installment aggregates and their closed status
//!   state machine (pending → paid, pending/paid → cancelled via bill
//!   cascade, paid → pending on reversal only).
//! - [`allocation`]: the oldest-due-first policy matching a generic client
//!   payment to exactly one installment.
//! - [`ledger`]: entrada/saída/pagamento-cliente transactions, with the
//!   instant-settlement restriction on expenses, plus dashboard summaries.
//! - [`sale`]: salesperson-facing sales records with price snapshots.
//! - [`ports`]: store seams whose conditional updates close the
//!   check-then-act race on status transitions.
//! - [`service`]: authorize → validate → execute orchestration, one audit
//!   entry per successful mutation.

pub mod allocation;
pub mod bill;
pub mod error;
pub mod ledger;
pub mod ports;
pub mod report;
pub mod sale;
pub mod service;

pub use bill::{
    Bill, Installment, InstallmentStatus, PendingFilter, PendingInstallmentRow,
    INSTALLMENT_INTERVAL_DAYS,
};
pub use error::BillingError;
pub use ledger::{
    PaymentMethod, Transaction, TransactionFilter, TransactionKind, TransactionSummary,
};
pub use ports::{BillStore, LedgerStore, SaleStore};
pub use report::ReportRenderer;
pub use sale::{Sale, SaleReport};
pub use service::{
    AllocationOutcome, BillingService, CreatedBill, LedgerService, NewBill, NewSale,
    NewTransaction, PayAllOutcome, SaleService,
};
