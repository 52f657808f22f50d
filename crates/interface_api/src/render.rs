//! CSV report renderer
//!
//! The default document renderer wired into the server binary. The core
//! hands it a pre-aggregated summary and the filtered rows; anything
//! fancier (PDF) would implement the same [`ReportRenderer`] port.

use core_kernel::PortError;
use domain_billing::{ReportRenderer, Transaction, TransactionSummary};

/// Renders transaction reports as CSV with a summary header
#[derive(Debug, Clone, Default)]
pub struct CsvReportRenderer;

impl CsvReportRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for CsvReportRenderer {
    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn render(
        &self,
        summary: &TransactionSummary,
        rows: &[Transaction],
    ) -> Result<Vec<u8>, PortError> {
        let mut out = String::new();
        out.push_str(&format!(
            "# entradas={};saidas={};saldo={};count={}\n",
            summary.total_entrada, summary.total_saida, summary.saldo, summary.count
        ));
        out.push_str("id,kind,amount,method,description,cancelled,created_at\n");
        for row in rows {
            out.push_str(&format!(
                "{},{},{},{},{:?},{},{}\n",
                row.id,
                row.kind,
                row.amount.amount(),
                row.method,
                row.description,
                row.cancelled,
                row.created_at.to_rfc3339()
            ));
        }
        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Money, UserId};
    use domain_billing::{PaymentMethod, TransactionKind};
    use rust_decimal_macros::dec;

    #[test]
    fn renders_summary_and_rows() {
        let transaction = Transaction::new(
            TransactionKind::Entrada,
            Money::brl(dec!(10.00)),
            "VENDA",
            PaymentMethod::Dinheiro,
            None,
            None,
            None,
            UserId::new(),
        );
        let summary = TransactionSummary::of([&transaction]);

        let bytes = CsvReportRenderer::new()
            .render(&summary, &[transaction])
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("# entradas=R$ 10.00"));
        assert!(text.contains("entrada"));
        assert!(text.contains("VENDA"));
    }
}
