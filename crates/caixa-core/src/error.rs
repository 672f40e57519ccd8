//! # Error Types
//!
//! Domain-specific error types for caixa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  caixa-core errors (this file)                                         │
//! │  ├── CoreError        - Register/ledger rule violations                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  caixa-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  caixa-service errors (separate crate)                                 │
//! │  └── ServiceError     - What callers see (domain vs. transient)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → Caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (register id, amounts)
//! 3. Errors are enum variants, never String
//! 4. Every variant is a *recoverable* condition: a failed operation writes
//!    nothing to the ledger and the caller retries or corrects

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Register and ledger rule violations.
///
/// All of these are local, recoverable conditions surfaced with no ledger
/// mutation. Nothing in this core is fatal.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An amount was negative (or zero where a positive is required).
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// A register for the store is already open.
    ///
    /// ## When This Occurs
    /// Surfaced by the single-open uniqueness constraint on insert, never
    /// by a race-prone read-then-write check.
    #[error("Store {store_id} already has an open register")]
    AlreadyOpen { store_id: String },

    /// The register was already closed.
    ///
    /// ## When This Occurs
    /// - Closing a register twice (the second close performs no mutation)
    /// - Losing a concurrent close race: the compare-and-set matched 0 rows
    #[error("Register {register_id} is already closed")]
    AlreadyClosed { register_id: String },

    /// Sale rejected: the cash balance reached the lock threshold.
    ///
    /// ## Corrective Action
    /// Perform a withdrawal (sangria). A withdrawal is the only way to
    /// clear a locked register.
    #[error(
        "Register {register_id} is locked: cash balance {cash_balance_cents} \
         reached threshold {threshold_cents}"
    )]
    RegisterLocked {
        register_id: String,
        cash_balance_cents: i64,
        threshold_cents: i64,
    },

    /// Sale rejected: the register is closed (or none is open).
    ///
    /// ## Corrective Action
    /// Open a register.
    #[error("Register {register_id} is closed")]
    RegisterClosed { register_id: String },

    /// Withdrawal exceeds the live cash balance. Nothing was written.
    #[error(
        "Insufficient balance: requested {requested_cents}, \
         drawer holds {available_cents}"
    )]
    InsufficientBalance {
        requested_cents: i64,
        available_cents: i64,
    },

    /// The Authorization Gate denied the action for this operator.
    #[error("Operator {operator_id} is not authorized for {action}")]
    Unauthorized { operator_id: String, action: String },

    /// Operator already has an active session.
    ///
    /// Should not occur given resume semantics, but guarded defensively
    /// for the insert race between two concurrent start requests.
    #[error("Operator {operator_id} already has an active session on register {register_id}")]
    DuplicateSession {
        register_id: String,
        operator_id: String,
    },

    /// A tender would overpay the remaining balance (mixed tender only;
    /// a single cash tender may overpay and produce change).
    #[error("Tender of {tendered_cents} exceeds remaining balance of {remaining_cents}")]
    TenderExceedsRemaining {
        tendered_cents: i64,
        remaining_cents: i64,
    },

    /// The collector was finalized before the total was covered.
    #[error("Payment incomplete: {remaining_cents} still due")]
    PaymentIncomplete { remaining_cents: i64 },

    /// A tender was added after the total was already covered.
    #[error("Payment already complete, no further tenders accepted")]
    PaymentComplete,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
