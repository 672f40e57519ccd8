//! # Report Rendering
//!
//! Renders a reconciliation report as plain structured text for print or
//! export. Formatting only; every figure comes from the report as generated
//! at close time.

use caixa_core::{Money, ReconciliationReport};

use crate::config::StoreConfig;

const WIDTH: usize = 42;

/// Renders a reconciliation report as plain text.
///
/// ## Output Shape
/// ```text
/// ==========================================
/// Loja - Fechamento de Caixa
/// Register: 7f3a...            2026-08-24
/// ==========================================
/// Opening float                     R$ 100.00
/// Sales (2 tenders)
///   Cash (1x)                        R$ 35.00
///   Pix (1x)                         R$ 20.00
/// ...
/// ```
pub fn render_report(report: &ReconciliationReport, config: &StoreConfig) -> String {
    let mut out = String::new();
    let rule = "=".repeat(WIDTH);
    let thin = "-".repeat(WIDTH);

    let money = |cents: i64| config.format_currency(Money::from_cents(cents));
    let line = |label: &str, value: &str| {
        let pad = WIDTH.saturating_sub(label.len() + value.len());
        format!("{}{}{}\n", label, " ".repeat(pad.max(1)), value)
    };

    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!("{} - Fechamento de Caixa\n", config.store_name));
    out.push_str(&format!("Register: {}\n", report.register_id));
    out.push_str(&format!(
        "Closed:   {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&rule);
    out.push('\n');

    out.push_str(&line("Opening float", &money(report.opening_amount_cents)));

    out.push_str(&format!("Sales ({} tenders)\n", report.sale_count));
    for summary in &report.sales {
        let label = format!("  {} ({}x)", summary.method.label(), summary.count);
        out.push_str(&line(&label, &money(summary.total_cents)));
    }
    out.push_str(&line("Sales total", &money(report.sales_total_cents)));
    if report.change_total_cents > 0 {
        out.push_str(&line("Change given", &money(report.change_total_cents)));
    }

    if !report.withdrawals.is_empty() {
        out.push_str("Withdrawals\n");
        for adj in &report.withdrawals {
            let label = format!("  {}", truncate(&adj.reason, WIDTH - 14));
            out.push_str(&line(&label, &money(adj.amount_cents)));
        }
        out.push_str(&line(
            "Withdrawals total",
            &money(report.withdrawal_total_cents),
        ));
    }

    if !report.deposits.is_empty() {
        out.push_str("Deposits\n");
        for adj in &report.deposits {
            let label = format!("  {}", truncate(&adj.reason, WIDTH - 14));
            out.push_str(&line(&label, &money(adj.amount_cents)));
        }
        out.push_str(&line("Deposits total", &money(report.deposit_total_cents)));
    }

    out.push_str(&thin);
    out.push('\n');
    out.push_str(&line("Expected cash", &money(report.expected_cash_cents)));
    out.push_str(&line("Counted cash", &money(report.counted_cash_cents)));
    out.push_str(&line("Variance", &money(report.variance_cents)));
    out.push_str(&line(
        "Status",
        if report.is_balanced() {
            "BALANCED"
        } else if report.variance_cents > 0 {
            "OVER"
        } else {
            "SHORT"
        },
    ));
    out.push_str(&rule);
    out.push('\n');

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
