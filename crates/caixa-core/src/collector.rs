//! # Payment Collector
//!
//! Accumulates one or more tenders against a sale total until fully
//! covered, then yields the ledger-ready tender list.
//!
//! ## Collection Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Split-Tender Collection                              │
//! │                                                                         │
//! │  PaymentCollector::new(total: 55.00, "order-42")                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  add_tender(Pix, 30.00)      remaining: 25.00                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  add_tender(Cash, 25.00)     remaining: 0.00 → is_complete             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  finalize() ──► [SaleTender(Pix, 30.00), SaleTender(Cash, 25.00)]      │
//! │                 each becomes one Sale ledger entry                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Overpayment Policy
//! - **Single cash tender**: may exceed the total. The recorded amount is
//!   clamped to the total and the excess becomes `change` — the drawer only
//!   ever records the price of the goods, never a negative movement.
//! - **Mixed tender**: no tender may exceed the remaining balance. The UI
//!   must not allow overpayment across mixed tenders, and this module
//!   rejects it defensively.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::TenderMethod;

// =============================================================================
// Sale Tender
// =============================================================================

/// One finalized tender, ready to be appended as a Sale ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTender {
    /// How this tender was paid.
    pub method: TenderMethod,

    /// Amount recorded against the sale, in centavos. For an overpaid
    /// single cash tender this is clamped to the sale total.
    pub amount_cents: i64,

    /// Change returned to the customer, in centavos. Non-zero only for a
    /// single cash tender that exceeded the total.
    pub change_cents: i64,
}

impl SaleTender {
    /// Returns the recorded amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Returns the change as Money.
    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents)
    }
}

// =============================================================================
// Payment Collector
// =============================================================================

/// Collects tenders toward a sale total.
///
/// Pure state machine, no I/O: the service layer feeds the finalized
/// tenders to the ledger. `remaining()` is monotonically non-increasing as
/// tenders are added.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentCollector {
    /// Sale total to cover, in centavos.
    total_cents: i64,

    /// External order/sale id. Every tender of this sale carries it.
    reference_id: String,

    /// Tenders added so far, as entered (not clamped).
    tenders: Vec<(TenderMethod, i64)>,
}

impl PaymentCollector {
    /// Creates a collector for a sale total.
    ///
    /// ## Errors
    /// `InvalidAmount` if `total` is not positive. The order source owns
    /// line-item math; a zero or negative total never reaches the till.
    pub fn new(total: Money, reference_id: impl Into<String>) -> CoreResult<Self> {
        if !total.is_positive() {
            return Err(CoreError::InvalidAmount {
                reason: format!("sale total must be positive, got {}", total.cents()),
            });
        }

        Ok(PaymentCollector {
            total_cents: total.cents(),
            reference_id: reference_id.into(),
            tenders: Vec::new(),
        })
    }

    /// The sale total being collected.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// The external order/sale id.
    #[inline]
    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    /// Sum of tenders added so far, in centavos (as entered).
    pub fn tendered_cents(&self) -> i64 {
        self.tenders.iter().map(|(_, cents)| cents).sum()
    }

    /// What is still due. Never negative: an overpaid single cash tender
    /// drives remaining to zero, the excess is change.
    pub fn remaining(&self) -> Money {
        Money::from_cents((self.total_cents - self.tendered_cents()).max(0))
    }

    /// True once the tenders cover the total.
    pub fn is_complete(&self) -> bool {
        self.tendered_cents() >= self.total_cents
    }

    /// Adds one tender.
    ///
    /// ## Rules
    /// - amount must be positive (`InvalidAmount`)
    /// - no tenders accepted once complete (`PaymentComplete`)
    /// - a tender above the remaining balance is rejected
    ///   (`TenderExceedsRemaining`) — except cash as the *first* tender,
    ///   which may overpay the whole total and produce change
    pub fn add_tender(&mut self, method: TenderMethod, amount: Money) -> CoreResult<()> {
        if !amount.is_positive() {
            return Err(CoreError::InvalidAmount {
                reason: format!("tender amount must be positive, got {}", amount.cents()),
            });
        }

        if self.is_complete() {
            return Err(CoreError::PaymentComplete);
        }

        let remaining = self.remaining().cents();
        let cash_overpay_allowed = method == TenderMethod::Cash && self.tenders.is_empty();
        if amount.cents() > remaining && !cash_overpay_allowed {
            return Err(CoreError::TenderExceedsRemaining {
                tendered_cents: amount.cents(),
                remaining_cents: remaining,
            });
        }

        self.tenders.push((method, amount.cents()));
        Ok(())
    }

    /// Finalizes collection into ledger-ready tenders.
    ///
    /// ## Change Policy
    /// Exactly one tender, cash, above the total: recorded amount is
    /// clamped to the total, the excess becomes change. Mixed tenders are
    /// recorded exactly as entered with zero change (overpayment across
    /// mixed tenders was rejected at `add_tender`).
    ///
    /// ## Errors
    /// `PaymentIncomplete` if the total is not yet covered.
    pub fn finalize(self) -> CoreResult<Vec<SaleTender>> {
        if !self.is_complete() {
            return Err(CoreError::PaymentIncomplete {
                remaining_cents: self.remaining().cents(),
            });
        }

        if let [(TenderMethod::Cash, tendered)] = self.tenders[..] {
            let recorded = tendered.min(self.total_cents);
            let change = tendered - recorded;
            return Ok(vec![SaleTender {
                method: TenderMethod::Cash,
                amount_cents: recorded,
                change_cents: change,
            }]);
        }

        Ok(self
            .tenders
            .into_iter()
            .map(|(method, amount_cents)| SaleTender {
                method,
                amount_cents,
                change_cents: 0,
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn collector(total_cents: i64) -> PaymentCollector {
        PaymentCollector::new(Money::from_cents(total_cents), "order-42").unwrap()
    }

    #[test]
    fn test_rejects_non_positive_total() {
        assert!(matches!(
            PaymentCollector::new(Money::zero(), "o"),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert!(matches!(
            PaymentCollector::new(Money::from_cents(-100), "o"),
            Err(CoreError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_exact_single_tender() {
        let mut c = collector(5500);
        c.add_tender(TenderMethod::Pix, Money::from_cents(5500)).unwrap();

        assert!(c.is_complete());
        assert_eq!(c.remaining(), Money::zero());

        let tenders = c.finalize().unwrap();
        assert_eq!(tenders.len(), 1);
        assert_eq!(tenders[0].amount_cents, 5500);
        assert_eq!(tenders[0].change_cents, 0);
    }

    #[test]
    fn test_split_tender_completeness() {
        let mut c = collector(5500);

        c.add_tender(TenderMethod::Pix, Money::from_cents(3000)).unwrap();
        assert!(!c.is_complete());
        assert_eq!(c.remaining().cents(), 2500);

        c.add_tender(TenderMethod::Cash, Money::from_cents(2500)).unwrap();
        assert!(c.is_complete());
        assert_eq!(c.remaining().cents(), 0);

        let tenders = c.finalize().unwrap();
        assert_eq!(tenders.len(), 2);
        // Mixed tender: amounts exactly as entered, no change
        assert_eq!(tenders[0].amount_cents, 3000);
        assert_eq!(tenders[1].amount_cents, 2500);
        assert_eq!(tenders[0].change_cents + tenders[1].change_cents, 0);
    }

    #[test]
    fn test_remaining_monotonically_non_increasing() {
        let mut c = collector(10_000);
        let mut last = c.remaining().cents();

        for amount in [1000, 2500, 500, 6000] {
            c.add_tender(TenderMethod::Cash, Money::from_cents(amount)).unwrap();
            let now = c.remaining().cents();
            assert!(now <= last);
            last = now;
        }
        assert!(c.is_complete());
    }

    #[test]
    fn test_single_cash_overpay_yields_change() {
        let mut c = collector(3550);
        c.add_tender(TenderMethod::Cash, Money::from_cents(5000)).unwrap();

        assert!(c.is_complete());
        let tenders = c.finalize().unwrap();
        assert_eq!(tenders.len(), 1);
        // Recorded amount clamped to total; excess is change
        assert_eq!(tenders[0].amount_cents, 3550);
        assert_eq!(tenders[0].change_cents, 1450);
    }

    #[test]
    fn test_non_cash_cannot_overpay() {
        let mut c = collector(3550);
        let err = c
            .add_tender(TenderMethod::CardCredit, Money::from_cents(5000))
            .unwrap_err();
        assert!(matches!(err, CoreError::TenderExceedsRemaining { .. }));
        assert_eq!(c.tendered_cents(), 0);
    }

    #[test]
    fn test_mixed_tender_cannot_overpay() {
        let mut c = collector(5000);
        c.add_tender(TenderMethod::Pix, Money::from_cents(3000)).unwrap();

        // Cash overpay is only allowed as the sole tender
        let err = c
            .add_tender(TenderMethod::Cash, Money::from_cents(3000))
            .unwrap_err();
        assert!(matches!(err, CoreError::TenderExceedsRemaining { .. }));
        assert_eq!(c.remaining().cents(), 2000);
    }

    #[test]
    fn test_no_tender_after_complete() {
        let mut c = collector(1000);
        c.add_tender(TenderMethod::Cash, Money::from_cents(1000)).unwrap();

        let err = c
            .add_tender(TenderMethod::Cash, Money::from_cents(100))
            .unwrap_err();
        assert!(matches!(err, CoreError::PaymentComplete));
    }

    #[test]
    fn test_finalize_incomplete_fails() {
        let mut c = collector(5000);
        c.add_tender(TenderMethod::Pix, Money::from_cents(3000)).unwrap();

        let err = c.finalize().unwrap_err();
        assert!(matches!(
            err,
            CoreError::PaymentIncomplete { remaining_cents: 2000 }
        ));
    }

    #[test]
    fn test_rejects_non_positive_tender() {
        let mut c = collector(1000);
        assert!(matches!(
            c.add_tender(TenderMethod::Cash, Money::zero()),
            Err(CoreError::InvalidAmount { .. })
        ));
    }
}
