//! Transaction ledger
//!
//! Cash movements are one of three kinds: entrada (income), saída (expense)
//! and pagamento de cliente (a client payment settling exactly one
//! installment, a specialized income subtype). A transaction is created
//! active and has a single terminal transition: cancelled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, Currency, InstallmentId, Money, ProductId, TransactionId, UserId};

use crate::error::BillingError;

/// Payment methods accepted at the cash desk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash
    Dinheiro,
    /// Card (settles later through the acquirer)
    Cartao,
    /// Instant transfer
    Pix,
    /// Bank slip (settles on clearing)
    Boleto,
}

impl PaymentMethod {
    /// True when money actually moves at the moment of the transaction.
    ///
    /// Expenses are restricted to these methods: money leaving the business
    /// must not ride on deferred-settlement rails.
    pub fn settles_instantly(&self) -> bool {
        matches!(self, PaymentMethod::Dinheiro | PaymentMethod::Pix)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Dinheiro => "dinheiro",
            PaymentMethod::Cartao => "cartao",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Boleto => "boleto",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dinheiro" => Ok(PaymentMethod::Dinheiro),
            "cartao" => Ok(PaymentMethod::Cartao),
            "pix" => Ok(PaymentMethod::Pix),
            "boleto" => Ok(PaymentMethod::Boleto),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Transaction direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Income
    Entrada,
    /// Expense
    Saida,
    /// Client payment settling one installment
    PagamentoCliente,
}

impl TransactionKind {
    /// True when this kind counts toward income on the summary
    pub fn is_income(&self) -> bool {
        matches!(
            self,
            TransactionKind::Entrada | TransactionKind::PagamentoCliente
        )
    }

    /// Whether the given method may carry a transaction of this kind.
    ///
    /// Only expenses are restricted; this depends on the kind, so a bad
    /// combination is a business-rule violation, not a validation error.
    pub fn allows_method(&self, method: PaymentMethod) -> bool {
        match self {
            TransactionKind::Saida => method.settles_instantly(),
            TransactionKind::Entrada | TransactionKind::PagamentoCliente => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Entrada => "entrada",
            TransactionKind::Saida => "saida",
            TransactionKind::PagamentoCliente => "pagamento_cliente",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entrada" => Ok(TransactionKind::Entrada),
            "saida" => Ok(TransactionKind::Saida),
            "pagamento_cliente" => Ok(TransactionKind::PagamentoCliente),
            other => Err(format!("unknown transaction kind: {other}")),
        }
    }
}

/// A ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,
    /// Direction
    pub kind: TransactionKind,
    /// Amount, always positive
    pub amount: Money,
    /// Human description
    pub description: String,
    /// Payment method
    pub method: PaymentMethod,
    /// Linked product, if any
    pub product_id: Option<ProductId>,
    /// Linked client, if any
    pub client_id: Option<ClientId>,
    /// Settled installment (client payments only)
    pub installment_id: Option<InstallmentId>,
    /// User that recorded the transaction
    pub recorded_by: UserId,
    /// Cancelled flag
    pub cancelled: bool,
    /// Who cancelled it
    pub cancelled_by: Option<UserId>,
    /// When it was cancelled
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates an active ledger entry
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: TransactionKind,
        amount: Money,
        description: impl Into<String>,
        method: PaymentMethod,
        product_id: Option<ProductId>,
        client_id: Option<ClientId>,
        installment_id: Option<InstallmentId>,
        recorded_by: UserId,
    ) -> Self {
        Self {
            id: TransactionId::new_v7(),
            kind,
            amount,
            description: description.into(),
            method,
            product_id,
            client_id,
            installment_id,
            recorded_by,
            cancelled: false,
            cancelled_by: None,
            cancelled_at: None,
            created_at: Utc::now(),
        }
    }

    /// Transition active → cancelled (terminal)
    ///
    /// # Errors
    ///
    /// `BillingError::BusinessRule` when already cancelled.
    pub fn cancel(&mut self, by: UserId, at: DateTime<Utc>) -> Result<(), BillingError> {
        if self.cancelled {
            return Err(BillingError::business_rule(
                "transaction is already cancelled",
            ));
        }
        self.cancelled = true;
        self.cancelled_by = Some(by);
        self.cancelled_at = Some(at);
        Ok(())
    }
}

/// Read-side filter over the ledger
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub method: Option<PaymentMethod>,
    /// Inclusive lower bound on `created_at`
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub end_date: Option<DateTime<Utc>>,
    pub client_id: Option<ClientId>,
}

impl TransactionFilter {
    /// Returns true when the transaction satisfies every set filter
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(kind) = self.kind {
            if transaction.kind != kind {
                return false;
            }
        }
        if let Some(method) = self.method {
            if transaction.method != method {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if transaction.created_at < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if transaction.created_at > end {
                return false;
            }
        }
        if let Some(client_id) = self.client_id {
            if transaction.client_id != Some(client_id) {
                return false;
            }
        }
        true
    }
}

/// Pre-aggregated dashboard numbers handed to the report renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub total_entrada: Money,
    pub total_saida: Money,
    pub saldo: Money,
    pub count: usize,
}

impl TransactionSummary {
    /// Aggregates the given entries, skipping cancelled ones.
    ///
    /// Client payments count toward entrada.
    pub fn of<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let zero = Money::zero(Currency::BRL);
        let mut total_entrada = zero;
        let mut total_saida = zero;
        let mut count = 0usize;

        for transaction in transactions {
            if transaction.cancelled {
                continue;
            }
            count += 1;
            if transaction.kind.is_income() {
                total_entrada = total_entrada + transaction.amount;
            } else {
                total_saida = total_saida + transaction.amount;
            }
        }

        Self {
            total_entrada,
            total_saida,
            saldo: total_entrada - total_saida,
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn txn(kind: TransactionKind, amount: Money, method: PaymentMethod) -> Transaction {
        Transaction::new(
            kind,
            amount,
            "test",
            method,
            None,
            None,
            None,
            UserId::new(),
        )
    }

    #[test]
    fn expense_methods_are_restricted_to_instant_settlement() {
        assert!(TransactionKind::Saida.allows_method(PaymentMethod::Dinheiro));
        assert!(TransactionKind::Saida.allows_method(PaymentMethod::Pix));
        assert!(!TransactionKind::Saida.allows_method(PaymentMethod::Cartao));
        assert!(!TransactionKind::Saida.allows_method(PaymentMethod::Boleto));
    }

    #[test]
    fn income_accepts_any_method() {
        for method in [
            PaymentMethod::Dinheiro,
            PaymentMethod::Cartao,
            PaymentMethod::Pix,
            PaymentMethod::Boleto,
        ] {
            assert!(TransactionKind::Entrada.allows_method(method));
            assert!(TransactionKind::PagamentoCliente.allows_method(method));
        }
    }

    #[test]
    fn cancel_is_terminal() {
        let mut t = txn(
            TransactionKind::Entrada,
            Money::brl(dec!(50.00)),
            PaymentMethod::Dinheiro,
        );
        t.cancel(UserId::new(), Utc::now()).unwrap();
        assert!(t.cancelled);
        assert!(t.cancel(UserId::new(), Utc::now()).is_err());
    }

    #[test]
    fn summary_counts_client_payments_as_entrada() {
        let entries = vec![
            txn(
                TransactionKind::Entrada,
                Money::brl(dec!(100.00)),
                PaymentMethod::Dinheiro,
            ),
            txn(
                TransactionKind::PagamentoCliente,
                Money::brl(dec!(50.00)),
                PaymentMethod::Pix,
            ),
            txn(
                TransactionKind::Saida,
                Money::brl(dec!(30.00)),
                PaymentMethod::Dinheiro,
            ),
        ];

        let summary = TransactionSummary::of(entries.iter());
        assert_eq!(summary.total_entrada.amount(), dec!(150.00));
        assert_eq!(summary.total_saida.amount(), dec!(30.00));
        assert_eq!(summary.saldo.amount(), dec!(120.00));
        assert_eq!(summary.count, 3);
    }

    #[test]
    fn summary_skips_cancelled_entries() {
        let mut cancelled = txn(
            TransactionKind::Entrada,
            Money::brl(dec!(999.00)),
            PaymentMethod::Dinheiro,
        );
        cancelled.cancel(UserId::new(), Utc::now()).unwrap();
        let entries = vec![
            cancelled,
            txn(
                TransactionKind::Entrada,
                Money::brl(dec!(10.00)),
                PaymentMethod::Pix,
            ),
        ];

        let summary = TransactionSummary::of(entries.iter());
        assert_eq!(summary.total_entrada.amount(), dec!(10.00));
        assert_eq!(summary.count, 1);
    }

    #[test]
    fn filter_combines_with_and() {
        let t = txn(
            TransactionKind::Entrada,
            Money::brl(dec!(10.00)),
            PaymentMethod::Pix,
        );

        let hit = TransactionFilter {
            kind: Some(TransactionKind::Entrada),
            method: Some(PaymentMethod::Pix),
            ..Default::default()
        };
        assert!(hit.matches(&t));

        let miss = TransactionFilter {
            kind: Some(TransactionKind::Entrada),
            method: Some(PaymentMethod::Cartao),
            ..Default::default()
        };
        assert!(!miss.matches(&t));
    }
}
