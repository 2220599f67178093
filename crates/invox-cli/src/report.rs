//! Report rendering.

use invox_domain::AggregateReport;
use std::fmt::Write;

/// Render the aggregate report for stdout.
pub fn render_report(report: &AggregateReport) -> String {
    let mut out = String::new();

    writeln!(out, "\nInvoice Report").ok();
    writeln!(out, "* Total invoices: {}", report.total_count).ok();
    writeln!(out, "* Total amount: {}", format_amount(report.total_amount)).ok();

    writeln!(out, "\nBreakdown by client:").ok();
    for group in &report.clients {
        writeln!(
            out,
            "* {}: {} invoices (${})",
            group.client.as_deref().unwrap_or("(unknown)"),
            group.count,
            format_amount(group.amount),
        )
        .ok();
    }

    out
}

fn format_amount(amount: Option<f64>) -> String {
    match amount {
        Some(value) => format!("{value:.2}"),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invox_domain::{aggregate, InvoiceRecord};

    #[test]
    fn test_render_clean_report() {
        let records = vec![InvoiceRecord {
            file: "doc1.pdf".to_string(),
            client: Some("Acme Corp".to_string()),
            amount: Some(120.0),
            product: Some("Widget".to_string()),
        }];
        let rendered = render_report(&aggregate(&records));

        assert!(rendered.contains("Invoice Report"));
        assert!(rendered.contains("* Total invoices: 1"));
        assert!(rendered.contains("* Total amount: 120.00"));
        assert!(rendered.contains("* Acme Corp: 1 invoices ($120.00)"));
    }

    #[test]
    fn test_render_null_amounts_as_not_available() {
        let records = vec![InvoiceRecord {
            file: "doc1.pdf".to_string(),
            client: None,
            amount: None,
            product: None,
        }];
        let rendered = render_report(&aggregate(&records));

        assert!(rendered.contains("* Total amount: n/a"));
        assert!(rendered.contains("* (unknown): 1 invoices ($n/a)"));
    }
}
