//! PostgreSQL adapters for the domain store ports

pub mod audit;
pub mod billing;
pub mod registry;
pub mod users;

pub use audit::PgAuditLog;
pub use billing::{PgBillStore, PgLedgerStore, PgSaleStore};
pub use registry::{PgClientStore, PgProductStore};
pub use users::PgUserStore;

use rust_decimal::Decimal;

use core_kernel::{Currency, Money};

use crate::error::DatabaseError;

/// Rebuilds a [`Money`] value from its stored amount/currency pair
pub(crate) fn parse_money(amount: Decimal, currency: &str) -> Result<Money, DatabaseError> {
    let currency: Currency = currency
        .parse()
        .map_err(|e: core_kernel::MoneyError| DatabaseError::decode(e.to_string()))?;
    Ok(Money::new(amount, currency))
}
