//! Sales records
//!
//! A sale is the salesperson-facing record of handing goods over the
//! counter: who sold, what, how many and at which price at that moment.
//! Product name and unit price are denormalized snapshots; editing the
//! product later must not rewrite past sales.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, Currency, Money, ProductId, SaleId, UserId};

use crate::ledger::PaymentMethod;

/// A recorded sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Unique identifier
    pub id: SaleId,
    /// Salesperson (vendedor)
    pub seller_id: UserId,
    /// Salesperson name snapshot
    pub seller_name: String,
    /// Product sold
    pub product_id: ProductId,
    /// Product name snapshot
    pub product_name: String,
    /// Client, when the sale is tied to one
    pub client_id: Option<ClientId>,
    /// Units sold, at least 1
    pub quantity: u32,
    /// Unit price snapshot at sale time
    pub unit_price: Money,
    /// quantity × unit price
    pub total: Money,
    /// Payment method
    pub method: PaymentMethod,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Creates a sale, computing the total from quantity and unit price
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seller_id: UserId,
        seller_name: impl Into<String>,
        product_id: ProductId,
        product_name: impl Into<String>,
        client_id: Option<ClientId>,
        quantity: u32,
        unit_price: Money,
        method: PaymentMethod,
    ) -> Self {
        Self {
            id: SaleId::new_v7(),
            seller_id,
            seller_name: seller_name.into(),
            product_id,
            product_name: product_name.into(),
            client_id,
            quantity,
            unit_price,
            total: unit_price.multiply(Decimal::from(quantity)),
            method,
            created_at: Utc::now(),
        }
    }
}

/// Per-seller report: the "Meus Relatórios" view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleReport {
    pub total_sales: Money,
    pub count: usize,
    pub sales: Vec<Sale>,
}

impl SaleReport {
    /// Builds a report from a seller's sales
    pub fn of(sales: Vec<Sale>) -> Self {
        let total_sales = sales
            .iter()
            .fold(Money::zero(Currency::BRL), |acc, s| acc + s.total);
        Self {
            count: sales.len(),
            total_sales,
            sales,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn total_is_quantity_times_unit_price() {
        let sale = Sale::new(
            UserId::new(),
            "VERONICA",
            ProductId::new(),
            "Cable",
            None,
            3,
            Money::brl(dec!(25.50)),
            PaymentMethod::Dinheiro,
        );
        assert_eq!(sale.total.amount(), dec!(76.50));
    }

    #[test]
    fn report_sums_sales() {
        let make = |total| {
            Sale::new(
                UserId::new(),
                "VERONICA",
                ProductId::new(),
                "Plan",
                None,
                1,
                Money::brl(total),
                PaymentMethod::Pix,
            )
        };
        let report = SaleReport::of(vec![make(dec!(10.00)), make(dec!(15.00))]);
        assert_eq!(report.count, 2);
        assert_eq!(report.total_sales.amount(), dec!(25.00));
    }
}
