//! Test Utilities Crate
//!
//! Shared test infrastructure for the cash-system workspace:
//!
//! - `memory`: in-memory adapters for every store port, honouring the same
//!   conditional-update atomicity contract as the Postgres adapters
//! - `harness`: a fully wired [`TestBackOffice`] over those adapters
//! - `builders`: builder patterns for request types
//! - `fixtures`: pre-built actors and valid identity documents

pub mod builders;
pub mod fixtures;
pub mod harness;
pub mod memory;

pub use builders::*;
pub use fixtures::*;
pub use harness::TestBackOffice;
pub use memory::*;
