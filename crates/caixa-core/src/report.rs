//! # Reconciliation Report
//!
//! End-of-shift summary reconciling expected vs. counted cash and
//! per-method totals.
//!
//! ## Generation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Close-Time Reconciliation                            │
//! │                                                                         │
//! │  close_register(counted_cash)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Replay the ledger ──► LedgerTotals::fold(entries)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReconciliationReport::generate(...)                                   │
//! │       │          expected_cash = opening + cash sales                  │
//! │       │                         + deposits − withdrawals               │
//! │       │          variance      = counted − expected (signed)           │
//! │       ▼                                                                 │
//! │  Persisted as JSON on the Closed register. Immutable thereafter.       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The report is a pure data structure; rendering to print/export text is
//! a formatting concern that lives in the service layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::balance::LedgerTotals;
use crate::money::Money;
use crate::types::{EntryKind, LedgerEntry, Register, TenderMethod};

// =============================================================================
// Report Lines
// =============================================================================

/// Sales summary for one tender method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MethodSummary {
    pub method: TenderMethod,
    /// Number of Sale entries with this method.
    pub count: u32,
    /// Sum of their amounts, in centavos.
    pub total_cents: i64,
}

/// One withdrawal or deposit, with its stated reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdjustmentLine {
    pub reason: String,
    pub amount_cents: i64,
    pub operator_id: String,
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
}

// =============================================================================
// Reconciliation Report
// =============================================================================

/// The end-of-shift reconciliation report.
///
/// Generated exactly once as part of the close transition, persisted
/// alongside the Closed register, immutable thereafter. Replaying the same
/// ledger always regenerates the same figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReconciliationReport {
    /// Register this report reconciles.
    pub register_id: String,

    /// Cash in the drawer when the shift opened, in centavos.
    pub opening_amount_cents: i64,

    /// Sales grouped by tender method, stable order.
    pub sales: Vec<MethodSummary>,

    /// Total number of Sale entries (tenders, not orders).
    pub sale_count: u32,

    /// Gross sales across all methods, in centavos.
    pub sales_total_cents: i64,

    /// Total change handed back on cash sales, in centavos.
    pub change_total_cents: i64,

    /// Withdrawals with reasons, in ledger order.
    pub withdrawals: Vec<AdjustmentLine>,
    pub withdrawal_total_cents: i64,

    /// Deposits with reasons, in ledger order.
    pub deposits: Vec<AdjustmentLine>,
    pub deposit_total_cents: i64,

    /// Cash the ledger says should be in the drawer, in centavos.
    pub expected_cash_cents: i64,

    /// Cash the operator counted at close, in centavos.
    pub counted_cash_cents: i64,

    /// counted − expected, signed. Positive: drawer over. Negative: short.
    pub variance_cents: i64,

    /// When the report was generated (the close instant).
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
}

impl ReconciliationReport {
    /// Replays a register's ledger into the reconciliation report.
    ///
    /// ## Arguments
    /// * `register` - the register being closed
    /// * `entries` - its complete ledger, in recorded order
    /// * `counted_cash` - operator-counted physical cash
    /// * `generated_at` - the close instant (stamped by the close transition
    ///   so register and report carry the same timestamp)
    pub fn generate(
        register: &Register,
        entries: &[LedgerEntry],
        counted_cash: Money,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let totals = LedgerTotals::fold(entries);

        let sales: Vec<MethodSummary> = totals
            .sales_by_method
            .iter()
            .map(|(method, t)| MethodSummary {
                method: *method,
                count: t.count,
                total_cents: t.total_cents,
            })
            .collect();
        let sales_total_cents = sales.iter().map(|s| s.total_cents).sum();

        let adjustment_lines = |kind: EntryKind| -> Vec<AdjustmentLine> {
            entries
                .iter()
                .filter(|e| e.kind == kind)
                .map(|e| AdjustmentLine {
                    reason: e.reason.clone().unwrap_or_default(),
                    amount_cents: e.amount_cents,
                    operator_id: e.operator_id.clone(),
                    recorded_at: e.recorded_at,
                })
                .collect()
        };

        let expected_cash_cents = register.opening_amount_cents
            + totals.cash_sales_cents()
            + totals.deposit_total_cents
            - totals.withdrawal_total_cents;

        ReconciliationReport {
            register_id: register.id.clone(),
            opening_amount_cents: register.opening_amount_cents,
            sales,
            sale_count: totals.sale_count,
            sales_total_cents,
            change_total_cents: totals.change_total_cents,
            withdrawals: adjustment_lines(EntryKind::Withdrawal),
            withdrawal_total_cents: totals.withdrawal_total_cents,
            deposits: adjustment_lines(EntryKind::Deposit),
            deposit_total_cents: totals.deposit_total_cents,
            expected_cash_cents,
            counted_cash_cents: counted_cash.cents(),
            variance_cents: counted_cash.cents() - expected_cash_cents,
            generated_at,
        }
    }

    /// Returns the signed variance as Money.
    #[inline]
    pub fn variance(&self) -> Money {
        Money::from_cents(self.variance_cents)
    }

    /// True when the drawer reconciled exactly.
    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.variance_cents == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
