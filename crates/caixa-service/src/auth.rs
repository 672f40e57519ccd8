//! # Authorization Gate
//!
//! Capability boundary for privileged register operations.
//!
//! ## Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Authorization Boundary                            │
//! │                                                                         │
//! │  The engine does NOT do identity. It asks one synchronous question:     │
//! │                                                                         │
//! │      gate.authorize(RegisterAction::Withdrawal, "op-7")  → bool         │
//! │                                                                         │
//! │  Privileged:   open, close, withdrawal, deposit                         │
//! │  Unprivileged: recording sales, reading balances                        │
//! │                                                                         │
//! │  Who answers is the embedding app's business: a PIN pad, a manager      │
//! │  card swipe, an RBAC lookup. The engine only refuses to mutate when     │
//! │  the answer is no — and refuses BEFORE anything is written.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

/// Privileged register operations that pass through the gate.
///
/// Sale recording is deliberately absent: any operator with an active
/// terminal session may record sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterAction {
    /// Opening a register for the day.
    OpenRegister,
    /// Closing a register and producing the reconciliation report.
    CloseRegister,
    /// Removing cash from the drawer (sangria).
    Withdrawal,
    /// Adding cash to the drawer (suprimento).
    Deposit,
}

impl RegisterAction {
    /// Human-readable action name, used in `Unauthorized` errors.
    pub fn label(&self) -> &'static str {
        match self {
            RegisterAction::OpenRegister => "open register",
            RegisterAction::CloseRegister => "close register",
            RegisterAction::Withdrawal => "withdrawal",
            RegisterAction::Deposit => "deposit",
        }
    }
}

/// Synchronous capability check for privileged operations.
///
/// Implementations must be cheap: the gate is consulted on the hot path of
/// every privileged call, before any validation or I/O.
pub trait AuthorizationGate: Send + Sync {
    /// Returns true if `operator_id` may perform `action`.
    fn authorize(&self, action: RegisterAction, operator_id: &str) -> bool;
}

/// Gate that authorizes everything.
///
/// For single-operator setups and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AuthorizationGate for AllowAll {
    fn authorize(&self, _action: RegisterAction, _operator_id: &str) -> bool {
        true
    }
}

/// Gate backed by a fixed set of privileged operator ids.
///
/// ## Example
/// ```rust,ignore
/// let gate = StaticGate::new(["manager-1", "manager-2"]);
/// assert!(gate.authorize(RegisterAction::Withdrawal, "manager-1"));
/// assert!(!gate.authorize(RegisterAction::Withdrawal, "cashier-9"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticGate {
    privileged: HashSet<String>,
}

impl StaticGate {
    /// Creates a gate from a list of privileged operator ids.
    pub fn new<I, S>(operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticGate {
            privileged: operators.into_iter().map(Into::into).collect(),
        }
    }
}

impl AuthorizationGate for StaticGate {
    fn authorize(&self, _action: RegisterAction, operator_id: &str) -> bool {
        self.privileged.contains(operator_id)
    }
}
