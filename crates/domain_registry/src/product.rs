//! Product aggregate
//!
//! Products are soft-deleted: historical bills and transactions carry
//! denormalized snapshots (name, price at sale time), so a product row is
//! never removed, only flagged inactive. Code and name uniqueness applies
//! among *active* products only, letting a retired code be reused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, ProductId};

/// A product or service plan sold by the business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Short code, unique among active products
    pub code: String,
    /// Display name, unique among active products
    pub name: String,
    /// Current unit price; overrides the bill total when a bill references
    /// this product
    pub price: Money,
    /// Free-form description
    pub description: Option<String>,
    /// Tracked stock quantity; `None` means unlimited (e.g. service plans)
    pub stock: Option<i64>,
    /// Soft-delete flag
    pub active: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new active product
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        price: Money,
        description: Option<String>,
        stock: Option<i64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new_v7(),
            code: code.into(),
            name: name.into(),
            price,
            description,
            stock,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when a sale can currently draw one unit
    pub fn has_stock(&self) -> bool {
        match self.stock {
            None => true,
            Some(quantity) => quantity > 0,
        }
    }

    /// Flags the product inactive
    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unlimited_stock_always_available() {
        let p = Product::new("PLAN", "Internet Plan", Money::brl(dec!(100)), None, None);
        assert!(p.has_stock());
    }

    #[test]
    fn tracked_stock_exhausts() {
        let mut p = Product::new("CBL", "Cable", Money::brl(dec!(25)), None, Some(1));
        assert!(p.has_stock());
        p.stock = Some(0);
        assert!(!p.has_stock());
    }
}
