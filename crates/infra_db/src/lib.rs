//! Infrastructure Database Layer
//!
//! PostgreSQL adapters for every store port in the workspace, built on SQLx
//! runtime queries so the workspace compiles without a live database.
//!
//! # Concurrency contract
//!
//! Status transitions (pay, revert, cancel) are conditional UPDATEs with a
//! RETURNING clause: the precondition check and the write are one atomic
//! statement, closing the check-then-act race two concurrent requests could
//! otherwise exploit. Multi-row writes (bill + installments, bill
//! cancellation cascade) run inside transactions.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PgBillStore};
//!
//! let pool = create_pool(&DatabaseConfig::new(url)).await?;
//! run_migrations(&pool).await?;
//! let bills = PgBillStore::new(pool.clone());
//! ```

pub mod error;
pub mod pool;
pub mod repository;

pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig};
pub use repository::{
    PgAuditLog, PgBillStore, PgClientStore, PgLedgerStore, PgProductStore, PgSaleStore,
    PgUserStore,
};
