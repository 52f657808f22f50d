//! Core Kernel - Foundational types and utilities for the cash system
//!
//! This crate provides the fundamental building blocks used across all domain
//! modules:
//! - Money types with precise decimal arithmetic (and the installment
//!   allocation policy)
//! - Strongly-typed identifiers
//! - Common error types and the ports-and-adapters infrastructure

pub mod error;
pub mod identifiers;
pub mod money;
pub mod ports;

pub use error::CoreError;
pub use identifiers::{
    ActivityId, BillId, ClientId, InstallmentId, ProductId, SaleId, TransactionId, UserId,
};
pub use money::{Currency, Money, MoneyError};
pub use ports::{DomainPort, PortError};
