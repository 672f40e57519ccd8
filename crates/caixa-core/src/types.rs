//! # Domain Types
//!
//! Core domain types for the register (till) engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Register     │   │   LedgerEntry   │   │ TerminalSession │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  store_id       │   │  register_id    │   │  register_id    │       │
//! │  │  status         │   │  kind           │   │  terminal_name  │       │
//! │  │  opening_cents  │   │  amount_cents   │   │  operator_id    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ RegisterStatus  │   │   EntryKind     │   │  TenderMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Open           │   │  Sale           │   │  Cash           │       │
//! │  │  Closed         │   │  Withdrawal     │   │  CardDebit      │       │
//! │  │                 │   │  Deposit        │   │  CardCredit     │       │
//! │  │  (Locked is     │   └─────────────────┘   │  Pix            │       │
//! │  │   DERIVED)      │                         │  Other          │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived, Never Stored
//! The register carries **no** running balance field. Cash on hand, the
//! per-method totals, and the locked flag are folded from the ledger on
//! every read (see [`crate::balance`]). Two terminals appending sales
//! concurrently never contend on a shared counter, only on independent
//! inserts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Register Status
// =============================================================================

/// The status of a register (till).
///
/// ## Note
/// `Locked` is intentionally **not** a variant. Locking is a computed
/// sub-state of `Open`: the register is locked while the live cash balance
/// has reached the configured lock threshold. Storing it would reintroduce
/// the stale-counter drift this design exists to eliminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RegisterStatus {
    /// Register is open and accepting operations.
    Open,
    /// Register was closed at end of shift. Terminal state, immutable.
    Closed,
}

// =============================================================================
// Tender Method
// =============================================================================

/// How a sale tender was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TenderMethod {
    /// Physical cash. The only method that moves the drawer balance.
    Cash,
    /// Debit card on external terminal.
    CardDebit,
    /// Credit card on external terminal.
    CardCredit,
    /// Pix instant transfer.
    Pix,
    /// Anything else (voucher, meal ticket, ...).
    Other,
}

impl TenderMethod {
    /// Display label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            TenderMethod::Cash => "Cash",
            TenderMethod::CardDebit => "Debit card",
            TenderMethod::CardCredit => "Credit card",
            TenderMethod::Pix => "Pix",
            TenderMethod::Other => "Other",
        }
    }
}

// =============================================================================
// Entry Kind
// =============================================================================

/// The kind of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// One tender of a sale. A split-tender sale produces several Sale
    /// entries sharing the same `reference_id`.
    Sale,
    /// Cash removed from the drawer (sangria), e.g. a bank deposit run.
    Withdrawal,
    /// Cash added to the drawer (suprimento), e.g. change reinforcement.
    Deposit,
}

// =============================================================================
// Register
// =============================================================================

/// A register (till) for one shift.
///
/// ## Lifecycle
/// ```text
/// open_register ──► Open ──► close_register ──► Closed (terminal)
/// ```
///
/// Created by the open transition, mutated only by the close transition.
/// Everything else about its financial state is derived from the ledger.
///
/// ## Invariant
/// At most one register per store has `status = Open`. Enforced by the
/// database (partial unique index), never by a read-then-write check.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Register {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Store this register belongs to.
    pub store_id: String,

    /// Open or Closed. Locked is derived, see [`RegisterStatus`].
    pub status: RegisterStatus,

    /// Cash in the drawer when the shift opened, in centavos. Never negative.
    pub opening_amount_cents: i64,

    /// Cash-on-hand ceiling in centavos. Once the live cash balance reaches
    /// this, new sales are rejected until a withdrawal clears it.
    /// `None` disables locking.
    pub lock_threshold_cents: Option<i64>,

    /// Operator-counted cash at close, in centavos. Set only by the close
    /// transition.
    pub closing_amount_cents: Option<i64>,

    /// Free-form closing notes.
    pub notes: Option<String>,

    /// Operator who opened the register.
    pub opened_by: String,

    /// Operator who closed the register.
    pub closed_by: Option<String>,

    /// When the shift opened.
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,

    /// When the shift closed.
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Register {
    /// Returns the opening amount as Money.
    #[inline]
    pub fn opening_amount(&self) -> Money {
        Money::from_cents(self.opening_amount_cents)
    }

    /// Returns the lock threshold as Money, if configured.
    #[inline]
    pub fn lock_threshold(&self) -> Option<Money> {
        self.lock_threshold_cents.map(Money::from_cents)
    }

    /// Checks whether the register is open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == RegisterStatus::Open
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// One monetary event in the append-only operation ledger.
///
/// ## Immutability
/// Entries are never updated or deleted. Corrections are new entries;
/// reversals are the order layer's concern, not the till's. Amounts are
/// always positive — the `kind` carries the sign of the movement.
///
/// ## Field Usage Per Kind
/// ```text
/// ┌────────────┬───────────────┬──────────────┬──────────────┬─────────┐
/// │  kind      │ tender_method │ change_cents │ reference_id │ reason  │
/// ├────────────┼───────────────┼──────────────┼──────────────┼─────────┤
/// │ Sale       │ Some(_)       │ cash only    │ Some(order)  │ None    │
/// │ Withdrawal │ None          │ 0            │ None         │ Some(_) │
/// │ Deposit    │ None          │ 0            │ None         │ Some(_) │
/// └────────────┴───────────────┴──────────────┴──────────────┴─────────┘
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    /// Unique identifier (UUID v4). Doubles as the idempotency key for
    /// retried appends: re-inserting the same id is a unique violation,
    /// never a duplicate money movement.
    pub id: String,

    /// Register this entry belongs to.
    pub register_id: String,

    /// Sale, Withdrawal, or Deposit.
    pub kind: EntryKind,

    /// Tender method. Present on Sale entries only.
    pub tender_method: Option<TenderMethod>,

    /// Amount in centavos. Always positive.
    pub amount_cents: i64,

    /// Change returned to the customer, in centavos. Non-zero only on
    /// single cash tenders that exceeded the sale total. Change is tracked
    /// here, never as a negative amount.
    pub change_cents: i64,

    /// External sale/order id. All tenders of one sale share it.
    pub reference_id: Option<String>,

    /// Reason for a Withdrawal or Deposit (e.g. "bank deposit run").
    pub reason: Option<String>,

    /// Operator who recorded the entry.
    pub operator_id: String,

    /// When the entry was recorded.
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Creates a Sale entry for one tender of an order.
    pub fn sale(
        register_id: &str,
        method: TenderMethod,
        amount: Money,
        change: Money,
        reference_id: &str,
        operator_id: &str,
    ) -> Self {
        LedgerEntry {
            id: uuid::Uuid::new_v4().to_string(),
            register_id: register_id.to_string(),
            kind: EntryKind::Sale,
            tender_method: Some(method),
            amount_cents: amount.cents(),
            change_cents: change.cents(),
            reference_id: Some(reference_id.to_string()),
            reason: None,
            operator_id: operator_id.to_string(),
            recorded_at: Utc::now(),
        }
    }

    /// Creates a Withdrawal (sangria) entry.
    pub fn withdrawal(register_id: &str, amount: Money, reason: &str, operator_id: &str) -> Self {
        LedgerEntry {
            id: uuid::Uuid::new_v4().to_string(),
            register_id: register_id.to_string(),
            kind: EntryKind::Withdrawal,
            tender_method: None,
            amount_cents: amount.cents(),
            change_cents: 0,
            reference_id: None,
            reason: Some(reason.to_string()),
            operator_id: operator_id.to_string(),
            recorded_at: Utc::now(),
        }
    }

    /// Creates a Deposit (suprimento) entry.
    pub fn deposit(register_id: &str, amount: Money, reason: &str, operator_id: &str) -> Self {
        LedgerEntry {
            id: uuid::Uuid::new_v4().to_string(),
            register_id: register_id.to_string(),
            kind: EntryKind::Deposit,
            tender_method: None,
            amount_cents: amount.cents(),
            change_cents: 0,
            reference_id: None,
            reason: Some(reason.to_string()),
            operator_id: operator_id.to_string(),
            recorded_at: Utc::now(),
        }
    }

    /// Returns the entry amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Returns the change given as Money.
    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents)
    }

    /// Checks whether this entry moves physical cash in the drawer.
    /// Cash sales and deposits add, withdrawals remove, everything else
    /// never touches the drawer.
    pub fn moves_cash(&self) -> bool {
        match self.kind {
            EntryKind::Sale => self.tender_method == Some(TenderMethod::Cash),
            EntryKind::Withdrawal | EntryKind::Deposit => true,
        }
    }
}

// =============================================================================
// Terminal Session
// =============================================================================

/// An operator's occupancy of a named POS terminal against a register.
///
/// ## Invariants
/// - At most one session with `ended_at = NULL` per (register, operator).
///   Enforced by a partial unique index; a concurrent double-start loses
///   the insert race and resumes the winner's session.
/// - The terminal name is a display label drawn from the store-configured
///   pool, NOT a physical lock. Two operators may pick the same label.
/// - Ending a session is idempotent.
///
/// The session holds no financial state; all sessions on one register share
/// the same ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TerminalSession {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Register this session operates against.
    pub register_id: String,

    /// Display label of the terminal (e.g. "Balcão 1").
    pub terminal_name: String,

    /// Operator occupying the terminal.
    pub operator_id: String,

    /// When the session started.
    #[ts(as = "String")]
    pub started_at: DateTime<Utc>,

    /// When the session ended. `None` means active.
    #[ts(as = "Option<String>")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl TerminalSession {
    /// Checks whether the session is still active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
