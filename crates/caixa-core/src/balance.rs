//! # Balance Derivation
//!
//! Folds the append-only ledger into the register's live balances.
//!
//! ## Why Fold Instead of Count?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │            STORED COUNTER vs. DERIVED BALANCE                           │
//! │                                                                         │
//! │  Stored counter (what we DON'T do):                                    │
//! │    Terminal A: read 100 ──► write 135   ┐                              │
//! │    Terminal B: read 100 ──► write 120   ┘ lost update, money gone      │
//! │                                                                         │
//! │  Derived balance (what we DO):                                         │
//! │    Terminal A: append Sale 35  ┐ independent inserts,                  │
//! │    Terminal B: append Sale 20  ┘ nothing to contend on                 │
//! │    Any reader: fold(ledger) = 100 + 35 + 20 = 155, always correct      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One pass over the shift's entries, O(n). A shift holds hundreds of
//! entries, not millions, so folding on every read is cheap and removes an
//! entire class of drift bugs.
//!
//! ## Formulas
//! ```text
//! cash_balance      = opening + Σ(Sale, cash) + Σ(Deposit) − Σ(Withdrawal)
//! method_balance[m] = Σ(Sale, method = m)                      (m ≠ cash)
//! is_locked         = threshold set AND cash_balance ≥ threshold
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{EntryKind, LedgerEntry, Register, TenderMethod};

// =============================================================================
// Ledger Totals
// =============================================================================

/// Per-method sale aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MethodTotal {
    /// Number of Sale entries with this method.
    pub count: u32,
    /// Sum of their amounts, in centavos.
    pub total_cents: i64,
}

/// The result of a single fold over a register's ledger.
///
/// Raw sums only; combine with the register's opening amount via
/// [`RegisterBalances::derive`] to get drawer figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerTotals {
    /// Sale totals grouped by tender method. BTreeMap keeps report output
    /// in a stable order.
    pub sales_by_method: BTreeMap<TenderMethod, MethodTotal>,

    /// Total number of Sale entries (tenders, not orders).
    pub sale_count: u32,

    /// Total change handed back on cash sales, in centavos.
    pub change_total_cents: i64,

    /// Sum of Withdrawal amounts, in centavos.
    pub withdrawal_total_cents: i64,

    /// Sum of Deposit amounts, in centavos.
    pub deposit_total_cents: i64,
}

impl LedgerTotals {
    /// Folds a register's entries in a single pass.
    ///
    /// Entries of other registers must be filtered out by the caller
    /// (the repository queries by `register_id`).
    pub fn fold(entries: &[LedgerEntry]) -> Self {
        let mut totals = LedgerTotals::default();

        for entry in entries {
            match entry.kind {
                EntryKind::Sale => {
                    // Sale entries always carry a method; a missing one is a
                    // malformed row and folds under Other rather than panic
                    let method = entry.tender_method.unwrap_or(TenderMethod::Other);
                    let slot = totals.sales_by_method.entry(method).or_default();
                    slot.count += 1;
                    slot.total_cents += entry.amount_cents;
                    totals.sale_count += 1;
                    totals.change_total_cents += entry.change_cents;
                }
                EntryKind::Withdrawal => {
                    totals.withdrawal_total_cents += entry.amount_cents;
                }
                EntryKind::Deposit => {
                    totals.deposit_total_cents += entry.amount_cents;
                }
            }
        }

        totals
    }

    /// Total of cash sales, in centavos.
    pub fn cash_sales_cents(&self) -> i64 {
        self.sales_by_method
            .get(&TenderMethod::Cash)
            .map(|t| t.total_cents)
            .unwrap_or(0)
    }

    /// Sale total for one method, in centavos.
    pub fn method_total_cents(&self, method: TenderMethod) -> i64 {
        self.sales_by_method
            .get(&method)
            .map(|t| t.total_cents)
            .unwrap_or(0)
    }
}

// =============================================================================
// Register Balances
// =============================================================================

/// The live, derived financial state of an open register.
///
/// Never stored. Recomputed from the ledger on every read, so it can be
/// momentarily stale across terminals by the visibility latency of the
/// latest append, and never any staler.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegisterBalances {
    /// Register these balances belong to.
    pub register_id: String,

    /// Physical cash in the drawer, in centavos.
    pub cash_balance_cents: i64,

    /// Sale totals per non-cash method, in centavos.
    pub method_balance_cents: BTreeMap<TenderMethod, i64>,

    /// Whether the lock threshold has been reached.
    ///
    /// Computed against the *net* drawer balance (after withdrawals), since
    /// a withdrawal is the stated mechanism for clearing a lock.
    pub is_locked: bool,
}

impl RegisterBalances {
    /// Derives balances from a register and its folded ledger.
    pub fn derive(register: &Register, totals: &LedgerTotals) -> Self {
        let cash_balance_cents = register.opening_amount_cents
            + totals.cash_sales_cents()
            + totals.deposit_total_cents
            - totals.withdrawal_total_cents;

        let method_balance_cents = totals
            .sales_by_method
            .iter()
            .filter(|(method, _)| **method != TenderMethod::Cash)
            .map(|(method, total)| (*method, total.total_cents))
            .collect();

        let is_locked = match register.lock_threshold_cents {
            Some(threshold) => cash_balance_cents >= threshold,
            None => false,
        };

        RegisterBalances {
            register_id: register.id.clone(),
            cash_balance_cents,
            method_balance_cents,
            is_locked,
        }
    }

    /// Returns the cash balance as Money.
    #[inline]
    pub fn cash_balance(&self) -> Money {
        Money::from_cents(self.cash_balance_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::types::RegisterStatus;

    fn test_register(opening_cents: i64, threshold_cents: Option<i64>) -> Register {
        Register {
            id: "reg-1".to_string(),
            store_id: "store-1".to_string(),
            status: RegisterStatus::Open,
            opening_amount_cents: opening_cents,
            lock_threshold_cents: threshold_cents,
            closing_amount_cents: None,
            notes: None,
            opened_by: "op-1".to_string(),
            closed_by: None,
            opened_at: Utc::now(),
            closed_at: None,
        }
    }

    fn sale(method: TenderMethod, cents: i64) -> LedgerEntry {
        LedgerEntry::sale(
            "reg-1",
            method,
            Money::from_cents(cents),
            Money::zero(),
            "order-1",
            "op-1",
        )
    }

    #[test]
    fn test_fold_empty_ledger() {
        let totals = LedgerTotals::fold(&[]);
        assert_eq!(totals.sale_count, 0);
        assert_eq!(totals.cash_sales_cents(), 0);
        assert_eq!(totals.withdrawal_total_cents, 0);
        assert_eq!(totals.deposit_total_cents, 0);
    }

    #[test]
    fn test_fold_groups_by_method() {
        let entries = vec![
            sale(TenderMethod::Cash, 3500),
            sale(TenderMethod::Cash, 1500),
            sale(TenderMethod::Pix, 2000),
            sale(TenderMethod::CardCredit, 4200),
        ];

        let totals = LedgerTotals::fold(&entries);

        assert_eq!(totals.sale_count, 4);
        assert_eq!(totals.cash_sales_cents(), 5000);
        assert_eq!(totals.method_total_cents(TenderMethod::Pix), 2000);
        assert_eq!(totals.method_total_cents(TenderMethod::CardCredit), 4200);
        assert_eq!(totals.method_total_cents(TenderMethod::CardDebit), 0);
        assert_eq!(totals.sales_by_method[&TenderMethod::Cash].count, 2);
    }

    /// Full shift fold: opening 100.00, Sale cash 35.00, Sale pix 20.00,
    /// Withdrawal 10.00 → cash_balance = 125.00, method[pix] = 20.00
    #[test]
    fn test_balance_invariant_scenario() {
        let register = test_register(10_000, None);
        let entries = vec![
            sale(TenderMethod::Cash, 3500),
            sale(TenderMethod::Pix, 2000),
            LedgerEntry::withdrawal(
                "reg-1",
                Money::from_cents(1000),
                "bank deposit run",
                "op-1",
            ),
        ];

        let totals = LedgerTotals::fold(&entries);
        let balances = RegisterBalances::derive(&register, &totals);

        assert_eq!(balances.cash_balance_cents, 12_500);
        assert_eq!(balances.method_balance_cents[&TenderMethod::Pix], 2000);
        assert!(!balances.is_locked);
    }

    #[test]
    fn test_deposit_raises_cash_balance() {
        let register = test_register(5000, None);
        let entries = vec![LedgerEntry::deposit(
            "reg-1",
            Money::from_cents(2500),
            "change reinforcement",
            "op-1",
        )];

        let balances = RegisterBalances::derive(&register, &LedgerTotals::fold(&entries));
        assert_eq!(balances.cash_balance_cents, 7500);
    }

    #[test]
    fn test_non_cash_sales_never_touch_drawer() {
        let register = test_register(10_000, None);
        let entries = vec![
            sale(TenderMethod::Pix, 9000),
            sale(TenderMethod::CardDebit, 4000),
        ];

        let balances = RegisterBalances::derive(&register, &LedgerTotals::fold(&entries));
        assert_eq!(balances.cash_balance_cents, 10_000);
    }

    /// Lock cycle: threshold 150.00, cash sales push the drawer to
    /// 160.00 → locked; withdrawing 20.00 brings it to 140.00 → unlocked.
    #[test]
    fn test_lock_threshold_crossing_and_clearing() {
        let register = test_register(10_000, Some(15_000));
        let mut entries = vec![sale(TenderMethod::Cash, 6000)];

        let balances = RegisterBalances::derive(&register, &LedgerTotals::fold(&entries));
        assert_eq!(balances.cash_balance_cents, 16_000);
        assert!(balances.is_locked);

        entries.push(LedgerEntry::withdrawal(
            "reg-1",
            Money::from_cents(2000),
            "clear lock",
            "op-1",
        ));
        let balances = RegisterBalances::derive(&register, &LedgerTotals::fold(&entries));
        assert_eq!(balances.cash_balance_cents, 14_000);
        assert!(!balances.is_locked);
    }

    #[test]
    fn test_lock_at_exact_threshold() {
        let register = test_register(10_000, Some(15_000));
        let entries = vec![sale(TenderMethod::Cash, 5000)];

        let balances = RegisterBalances::derive(&register, &LedgerTotals::fold(&entries));
        // 15_000 >= 15_000: reaching the threshold locks, not just crossing
        assert!(balances.is_locked);
    }

    #[test]
    fn test_no_threshold_never_locks() {
        let register = test_register(0, None);
        let entries = vec![sale(TenderMethod::Cash, 1_000_000)];

        let balances = RegisterBalances::derive(&register, &LedgerTotals::fold(&entries));
        assert!(!balances.is_locked);
    }

    #[test]
    fn test_change_total_accumulates() {
        let entries = vec![
            LedgerEntry::sale(
                "reg-1",
                TenderMethod::Cash,
                Money::from_cents(3500),
                Money::from_cents(150),
                "order-1",
                "op-1",
            ),
            LedgerEntry::sale(
                "reg-1",
                TenderMethod::Cash,
                Money::from_cents(1000),
                Money::from_cents(500),
                "order-2",
                "op-1",
            ),
        ];

        let totals = LedgerTotals::fold(&entries);
        assert_eq!(totals.change_total_cents, 650);
    }
}
