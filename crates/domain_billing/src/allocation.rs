//! Oldest-first payment allocation
//!
//! When a client hands over a generic payment there is no choosing which
//! installment it settles: the oldest outstanding one (by due date) wins.
//! This gives a deterministic FIFO settlement order per client/product pair
//! and removes any ambiguity from the cash desk.

use crate::bill::PendingInstallmentRow;

/// Orders candidate rows into allocation order: due date ascending, ties
/// broken by installment number, then bill creation time.
///
/// The caller walks the result front to back, taking the first row whose
/// conditional pending→paid update succeeds; under concurrent payments the
/// next-oldest row is simply the next candidate.
pub fn allocation_order(mut rows: Vec<PendingInstallmentRow>) -> Vec<PendingInstallmentRow> {
    rows.sort_by(|a, b| {
        a.installment
            .due_date
            .cmp(&b.installment.due_date)
            .then(a.installment.number.cmp(&b.installment.number))
            .then(a.bill.created_at.cmp(&b.bill.created_at))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::{Bill, Installment};
    use chrono::{DateTime, Duration, Utc};
    use core_kernel::{ClientId, Money, UserId};
    use rust_decimal_macros::dec;

    fn base() -> DateTime<Utc> {
        "2025-01-01T12:00:00Z".parse().unwrap()
    }

    fn row(due_in_days: i64, number: u32) -> PendingInstallmentRow {
        let bill = Bill::new(
            ClientId::new(),
            None,
            "test",
            Money::brl(dec!(100.00)),
            1,
            UserId::new(),
        );
        let installment = Installment::new(
            bill.id,
            number,
            Money::brl(dec!(50.00)),
            base() + Duration::days(due_in_days),
        );
        PendingInstallmentRow {
            installment,
            bill,
            client_name: "CLIENT".to_string(),
            product_name: None,
        }
    }

    #[test]
    fn oldest_due_date_comes_first() {
        let ordered = allocation_order(vec![row(60, 2), row(30, 1), row(90, 3)]);

        let numbers: Vec<u32> = ordered.iter().map(|r| r.installment.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn ties_break_by_installment_number() {
        let ordered = allocation_order(vec![row(30, 5), row(30, 2)]);
        assert_eq!(ordered[0].installment.number, 2);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(allocation_order(vec![]).is_empty());
    }
}
