//! Report renderer port
//!
//! The core never lays out a document: it aggregates the filtered ledger
//! into a [`TransactionSummary`] plus row data and hands both to whatever
//! renderer was wired in at startup. `interface_api` ships a plain CSV
//! renderer; a PDF engine would slot in behind the same trait.

use core_kernel::PortError;

use crate::ledger::{Transaction, TransactionSummary};

/// Renders a filtered, pre-aggregated transaction report into a binary
/// document
pub trait ReportRenderer: Send + Sync {
    /// The MIME type of the rendered document
    fn content_type(&self) -> &'static str;

    /// Produces the document bytes
    fn render(
        &self,
        summary: &TransactionSummary,
        rows: &[Transaction],
    ) -> Result<Vec<u8>, PortError>;
}
