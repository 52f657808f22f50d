//! Bill and installment aggregates
//!
//! A bill splits a total into `installment_count` installments due at
//! 30-day multiples from creation. Amounts come from [`Money::allocate`],
//! so they sum to the total exactly, with remainder centavos on the
//! earliest installments.
//!
//! Installment status transitions are a closed state machine:
//!
//! ```text
//! Pending ──mark_paid──────▶ Paid
//! Pending ──cancel─────────▶ Cancelled
//! Paid ────cancel──────────▶ Cancelled   (bill cascade only)
//! Paid ────revert──────────▶ Pending     (payment reversal only)
//! ```
//!
//! "Overdue" is a read-time view (`is_overdue`), never a stored status.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BillId, ClientId, InstallmentId, Money, ProductId, UserId};

use crate::error::BillingError;
use crate::ledger::PaymentMethod;

/// Days between consecutive installment due dates
pub const INSTALLMENT_INTERVAL_DAYS: i64 = 30;

/// Persisted installment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Cancelled,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallmentStatus::Pending => "pending",
            InstallmentStatus::Paid => "paid",
            InstallmentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InstallmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InstallmentStatus::Pending),
            "paid" => Ok(InstallmentStatus::Paid),
            "cancelled" => Ok(InstallmentStatus::Cancelled),
            other => Err(format!("unknown installment status: {other}")),
        }
    }
}

/// A billing obligation split into installments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier
    pub id: BillId,
    /// Billed client
    pub client_id: ClientId,
    /// Product whose price set the total, if any
    pub product_id: Option<ProductId>,
    /// Human description (shown on receipts)
    pub description: String,
    /// Total amount, always equal to the sum of installment amounts
    pub total: Money,
    /// Number of installments, at least 1
    pub installment_count: u32,
    /// Cancelled flag
    pub cancelled: bool,
    /// Who cancelled the bill
    pub cancelled_by: Option<UserId>,
    /// When the bill was cancelled
    pub cancelled_at: Option<DateTime<Utc>>,
    /// User that created the bill
    pub created_by: UserId,
    /// Created timestamp; anchors the due-date schedule
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Creates a new bill anchored at the current time
    pub fn new(
        client_id: ClientId,
        product_id: Option<ProductId>,
        description: impl Into<String>,
        total: Money,
        installment_count: u32,
        created_by: UserId,
    ) -> Self {
        Self {
            id: BillId::new_v7(),
            client_id,
            product_id,
            description: description.into(),
            total,
            installment_count,
            cancelled: false,
            cancelled_by: None,
            cancelled_at: None,
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Builds the installment rows for this bill.
    ///
    /// Installment `n` (1-based) is due `30 * n` days after creation. The
    /// amounts are a minor-unit allocation of the total, so their sum equals
    /// the total exactly.
    pub fn installment_schedule(&self) -> Result<Vec<Installment>, BillingError> {
        let amounts = self
            .total
            .allocate(self.installment_count)
            .map_err(|e| BillingError::Validation(e.to_string()))?;

        Ok(amounts
            .into_iter()
            .enumerate()
            .map(|(i, amount)| {
                let number = i as u32 + 1;
                Installment::new(
                    self.id,
                    number,
                    amount,
                    self.created_at + Duration::days(INSTALLMENT_INTERVAL_DAYS * number as i64),
                )
            })
            .collect())
    }

    /// Marks the bill cancelled
    ///
    /// # Errors
    ///
    /// `BillingError::BusinessRule` when already cancelled.
    pub fn cancel(&mut self, by: UserId, at: DateTime<Utc>) -> Result<(), BillingError> {
        if self.cancelled {
            return Err(BillingError::business_rule("bill is already cancelled"));
        }
        self.cancelled = true;
        self.cancelled_by = Some(by);
        self.cancelled_at = Some(at);
        Ok(())
    }
}

/// One scheduled portion of a bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    /// Unique identifier
    pub id: InstallmentId,
    /// Parent bill
    pub bill_id: BillId,
    /// 1-based sequence number within the bill
    pub number: u32,
    /// Amount of this installment
    pub amount: Money,
    /// Due date
    pub due_date: DateTime<Utc>,
    /// Status (overdue is derived, never stored)
    pub status: InstallmentStatus,
    /// When the installment was paid
    pub paid_at: Option<DateTime<Utc>>,
    /// Who received the payment
    pub paid_by: Option<UserId>,
    /// How the payment was made
    pub paid_method: Option<PaymentMethod>,
    /// When the installment was cancelled
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Who cancelled it (directly or through the bill)
    pub cancelled_by: Option<UserId>,
}

impl Installment {
    /// Creates a pending installment
    pub fn new(bill_id: BillId, number: u32, amount: Money, due_date: DateTime<Utc>) -> Self {
        Self {
            id: InstallmentId::new_v7(),
            bill_id,
            number,
            amount,
            due_date,
            status: InstallmentStatus::Pending,
            paid_at: None,
            paid_by: None,
            paid_method: None,
            cancelled_at: None,
            cancelled_by: None,
        }
    }

    /// Derived overdue view: pending and past due
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == InstallmentStatus::Pending && self.due_date < now
    }

    /// Transition Pending → Paid
    ///
    /// # Errors
    ///
    /// `BillingError::BusinessRule` unless the installment is pending.
    pub fn mark_paid(
        &mut self,
        by: UserId,
        method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Result<(), BillingError> {
        match self.status {
            InstallmentStatus::Pending => {
                self.status = InstallmentStatus::Paid;
                self.paid_at = Some(at);
                self.paid_by = Some(by);
                self.paid_method = Some(method);
                Ok(())
            }
            InstallmentStatus::Paid => {
                Err(BillingError::business_rule("installment is already paid"))
            }
            InstallmentStatus::Cancelled => {
                Err(BillingError::business_rule("installment is cancelled"))
            }
        }
    }

    /// Transition Paid → Pending, clearing payment metadata (reversal)
    ///
    /// # Errors
    ///
    /// `BillingError::BusinessRule` unless the installment is paid.
    pub fn revert_to_pending(&mut self) -> Result<(), BillingError> {
        if self.status != InstallmentStatus::Paid {
            return Err(BillingError::business_rule("installment is not paid"));
        }
        self.status = InstallmentStatus::Pending;
        self.paid_at = None;
        self.paid_by = None;
        self.paid_method = None;
        Ok(())
    }

    /// Cancels the installment as part of a bill cascade.
    ///
    /// Applies to any status, paid included. Cancelling a bill does not
    /// auto-reverse the transactions its paid installments produced. Payment
    /// metadata is kept as a historical snapshot.
    pub fn cancel(&mut self, by: UserId, at: DateTime<Utc>) {
        self.status = InstallmentStatus::Cancelled;
        self.cancelled_at = Some(at);
        self.cancelled_by = Some(by);
    }
}

/// A pending installment joined with its bill and registry context
///
/// This is the row shape of the cross-bill pending query: each pending
/// installment enriched with the client and product it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingInstallmentRow {
    pub installment: Installment,
    pub bill: Bill,
    pub client_name: String,
    pub product_name: Option<String>,
}

/// Filter for the cross-bill pending installment query
#[derive(Debug, Clone, Default)]
pub struct PendingFilter {
    /// Restrict to one client
    pub client_id: Option<ClientId>,
    /// Restrict to bills referencing one product
    pub product_id: Option<ProductId>,
    /// Only installments already past due
    pub overdue_only: bool,
    /// Due-date month (1-12)
    pub month: Option<u32>,
    /// Due-date year
    pub year: Option<i32>,
    /// Case-insensitive substring on the client name
    pub client_name: Option<String>,
}

impl PendingFilter {
    /// Returns true when the row satisfies every set filter.
    ///
    /// The row must already be pending on a non-cancelled bill; this checks
    /// the optional narrowing only. Shared by the in-memory adapter; the SQL
    /// adapter mirrors the same semantics.
    pub fn matches(&self, row: &PendingInstallmentRow, now: DateTime<Utc>) -> bool {
        if let Some(client_id) = self.client_id {
            if row.bill.client_id != client_id {
                return false;
            }
        }
        if let Some(product_id) = self.product_id {
            if row.bill.product_id != Some(product_id) {
                return false;
            }
        }
        if self.overdue_only && !row.installment.is_overdue(now) {
            return false;
        }
        if let Some(month) = self.month {
            if row.installment.due_date.month() != month {
                return false;
            }
        }
        if let Some(year) = self.year {
            if row.installment.due_date.year() != year {
                return false;
            }
        }
        if let Some(ref needle) = self.client_name {
            if !row
                .client_name
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn bill(total: Money, count: u32) -> Bill {
        Bill::new(
            ClientId::new(),
            None,
            "test bill",
            total,
            count,
            UserId::new(),
        )
    }

    #[test]
    fn schedule_has_count_rows_summing_to_total() {
        let b = bill(Money::brl(dec!(300.00)), 3);
        let schedule = b.installment_schedule().unwrap();

        assert_eq!(schedule.len(), 3);
        let sum: Decimal = schedule.iter().map(|i| i.amount.amount()).sum();
        assert_eq!(sum, dec!(300.00));
        for (i, installment) in schedule.iter().enumerate() {
            assert_eq!(installment.number, i as u32 + 1);
            assert_eq!(installment.amount.amount(), dec!(100.00));
            assert_eq!(installment.status, InstallmentStatus::Pending);
        }
    }

    #[test]
    fn due_dates_step_by_thirty_days() {
        let b = bill(Money::brl(dec!(100.00)), 3);
        let schedule = b.installment_schedule().unwrap();

        assert_eq!(schedule[0].due_date, b.created_at + Duration::days(30));
        assert_eq!(schedule[1].due_date, b.created_at + Duration::days(60));
        assert_eq!(schedule[2].due_date, b.created_at + Duration::days(90));
    }

    #[test]
    fn uneven_total_puts_remainder_on_first_installments() {
        let b = bill(Money::brl(dec!(100.00)), 3);
        let schedule = b.installment_schedule().unwrap();

        assert_eq!(schedule[0].amount.amount(), dec!(33.34));
        assert_eq!(schedule[1].amount.amount(), dec!(33.33));
        assert_eq!(schedule[2].amount.amount(), dec!(33.33));
    }

    #[test]
    fn zero_installments_is_rejected() {
        let b = bill(Money::brl(dec!(100.00)), 0);
        assert!(matches!(
            b.installment_schedule(),
            Err(BillingError::Validation(_))
        ));
    }

    #[test]
    fn pay_then_pay_again_fails_without_side_effects() {
        let b = bill(Money::brl(dec!(100.00)), 1);
        let mut installment = b.installment_schedule().unwrap().remove(0);
        let cashier = UserId::new();

        installment
            .mark_paid(cashier, PaymentMethod::Dinheiro, Utc::now())
            .unwrap();
        assert_eq!(installment.status, InstallmentStatus::Paid);
        let paid_at = installment.paid_at;

        let err = installment
            .mark_paid(cashier, PaymentMethod::Pix, Utc::now())
            .unwrap_err();
        assert!(matches!(err, BillingError::BusinessRule(_)));
        // No side effects from the failed attempt.
        assert_eq!(installment.paid_at, paid_at);
        assert_eq!(installment.paid_method, Some(PaymentMethod::Dinheiro));
    }

    #[test]
    fn cancelled_installment_cannot_be_paid() {
        let b = bill(Money::brl(dec!(100.00)), 1);
        let mut installment = b.installment_schedule().unwrap().remove(0);
        installment.cancel(UserId::new(), Utc::now());

        assert!(installment
            .mark_paid(UserId::new(), PaymentMethod::Dinheiro, Utc::now())
            .is_err());
    }

    #[test]
    fn reversal_clears_payment_metadata() {
        let b = bill(Money::brl(dec!(100.00)), 1);
        let mut installment = b.installment_schedule().unwrap().remove(0);
        installment
            .mark_paid(UserId::new(), PaymentMethod::Cartao, Utc::now())
            .unwrap();

        installment.revert_to_pending().unwrap();

        assert_eq!(installment.status, InstallmentStatus::Pending);
        assert!(installment.paid_at.is_none());
        assert!(installment.paid_by.is_none());
        assert!(installment.paid_method.is_none());
    }

    #[test]
    fn reverting_a_pending_installment_fails() {
        let b = bill(Money::brl(dec!(100.00)), 1);
        let mut installment = b.installment_schedule().unwrap().remove(0);
        assert!(installment.revert_to_pending().is_err());
    }

    #[test]
    fn cascade_cancel_keeps_paid_snapshot() {
        let b = bill(Money::brl(dec!(100.00)), 1);
        let mut installment = b.installment_schedule().unwrap().remove(0);
        installment
            .mark_paid(UserId::new(), PaymentMethod::Pix, Utc::now())
            .unwrap();

        installment.cancel(UserId::new(), Utc::now());

        assert_eq!(installment.status, InstallmentStatus::Cancelled);
        assert!(installment.paid_at.is_some());
        assert_eq!(installment.paid_method, Some(PaymentMethod::Pix));
    }

    #[test]
    fn overdue_is_derived_from_due_date_and_status() {
        let b = bill(Money::brl(dec!(100.00)), 1);
        let mut installment = b.installment_schedule().unwrap().remove(0);
        let after_due = installment.due_date + Duration::days(1);

        assert!(!installment.is_overdue(Utc::now()));
        assert!(installment.is_overdue(after_due));

        installment
            .mark_paid(UserId::new(), PaymentMethod::Dinheiro, Utc::now())
            .unwrap();
        assert!(!installment.is_overdue(after_due));
    }

    #[test]
    fn cancelling_twice_fails() {
        let mut b = bill(Money::brl(dec!(100.00)), 2);
        b.cancel(UserId::new(), Utc::now()).unwrap();
        assert!(b.cancel(UserId::new(), Utc::now()).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    proptest! {
        #[test]
        fn installment_sum_always_equals_total(
            minor in 1i64..100_000_000i64,
            count in 1u32..60u32
        ) {
            let total = Money::from_minor(minor, core_kernel::Currency::BRL);
            let b = Bill::new(
                ClientId::new(),
                None,
                "prop bill",
                total,
                count,
                UserId::new(),
            );
            let schedule = b.installment_schedule().unwrap();

            prop_assert_eq!(schedule.len(), count as usize);
            let sum: Decimal = schedule.iter().map(|i| i.amount.amount()).sum();
            prop_assert_eq!(sum, total.amount());
        }
    }
}
