//! # caixa-core: Pure Business Logic for the Caixa Register Engine
//!
//! This crate is the **heart** of the register (till) engine. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Caixa Register Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Terminal Clients (out of scope)                 │   │
//! │  │    Menu UI ──► Checkout ──► Tender UI ──► Shift Report UI      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 caixa-service (orchestration)                   │   │
//! │  │    open/close register, record sale, sangria, suprimento       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ caixa-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  balance  │  │ collector │  │  report   │  │   │
//! │  │   │ Register  │  │  ledger   │  │  split    │  │ shift     │  │   │
//! │  │   │  Ledger   │  │  folding  │  │  tender   │  │ reconcile │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    caixa-db (Database Layer)                    │   │
//! │  │           SQLite queries, migrations, repositories              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Register, LedgerEntry, TerminalSession, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`balance`] - Single-pass ledger folding into live drawer balances
//! - [`collector`] - Split-tender payment collection with change policy
//! - [`report`] - End-of-shift reconciliation report
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are centavos (i64) to avoid float errors
//! 4. **Derived Balances**: Drawer state is always folded from the ledger,
//!    never kept as a mutable counter
//! 5. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use caixa_core::collector::PaymentCollector;
//! use caixa_core::money::Money;
//! use caixa_core::types::TenderMethod;
//!
//! // Collect a split payment: R$ 55.00 as R$ 30.00 pix + R$ 25.00 cash
//! let mut collector = PaymentCollector::new(Money::from_cents(5500), "order-42").unwrap();
//! collector.add_tender(TenderMethod::Pix, Money::from_cents(3000)).unwrap();
//! collector.add_tender(TenderMethod::Cash, Money::from_cents(2500)).unwrap();
//! assert!(collector.is_complete());
//!
//! let tenders = collector.finalize().unwrap();
//! assert_eq!(tenders.len(), 2); // one ledger entry per tender
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod balance;
pub mod collector;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use caixa_core::Money` instead of
// `use caixa_core::money::Money`

pub use balance::{LedgerTotals, MethodTotal, RegisterBalances};
pub use collector::{PaymentCollector, SaleTender};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{AdjustmentLine, MethodSummary, ReconciliationReport};
pub use types::*;
pub use validation::{
    validate_opening_amount, validate_operator_id, validate_positive_amount, validate_reason,
    validate_terminal_name,
};
