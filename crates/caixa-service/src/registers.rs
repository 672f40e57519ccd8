//! # Register Service
//!
//! Orchestrates the register lifecycle: open, record sales, adjust cash,
//! close with reconciliation.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Shift, One Register                            │
//! │                                                                         │
//! │  open_register(op, 100.00)          Register { status: Open }           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  record_sale(collector)  ─┐                                             │
//! │  record_sale(collector)   ├─ ledger appends from N terminals            │
//! │  withdraw(10.00, reason) ─┘                                             │
//! │       │                                                                 │
//! │       │   balances() at any point = fold(ledger), never a counter       │
//! │       ▼                                                                 │
//! │  close_register(counted: 125.00)                                        │
//! │       └── replay ledger → ReconciliationReport → CAS close              │
//! │           (report JSON persisted in the same UPDATE)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering Inside Mutations
//! Gate check → validation → live-state check → ledger append. A rejected
//! operation writes nothing: there is no partial state to clean up because
//! every mutation is a single insert or a single compare-and-set.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use caixa_core::{
    validate_opening_amount, validate_operator_id, validate_positive_amount, validate_reason,
    CoreError, LedgerEntry, LedgerTotals, Money, PaymentCollector, ReconciliationReport, Register,
    RegisterBalances, RegisterStatus,
};
use caixa_db::{Database, DbError};

use crate::auth::{AuthorizationGate, RegisterAction};
use crate::config::StoreConfig;
use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Sale Outcome
// =============================================================================

/// What a terminal gets back from a recorded sale.
#[derive(Debug, Clone)]
pub struct SaleOutcome {
    /// Ids of the ledger entries appended for this sale, one per tender.
    pub entry_ids: Vec<String>,

    /// Change due back to the customer, in centavos.
    pub change_cents: i64,

    /// Fresh post-sale balances, including the `is_locked` flag the
    /// terminal uses to surface "call a manager" immediately.
    pub balances: RegisterBalances,
}

// =============================================================================
// Register Service
// =============================================================================

/// Service for register lifecycle and money movements.
///
/// Cheap to clone; the embedding app creates one per store and shares it
/// across terminal handlers.
#[derive(Clone)]
pub struct RegisterService {
    db: Database,
    gate: Arc<dyn AuthorizationGate>,
    config: StoreConfig,
}

impl RegisterService {
    /// Creates a register service for one store.
    pub fn new(db: Database, gate: Arc<dyn AuthorizationGate>, config: StoreConfig) -> Self {
        RegisterService { db, gate, config }
    }

    /// The store configuration this service operates under.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Opens a register for the store.
    ///
    /// The lock threshold is the override if given, else the configured
    /// store default, else none. The single-open invariant is enforced by
    /// the database's partial unique index, not by a read-then-write.
    ///
    /// ## Errors
    /// - `Unauthorized` - gate refused the operator
    /// - `Validation` - negative opening amount, non-positive threshold
    /// - `AlreadyOpen` - the store already has an open register
    pub async fn open_register(
        &self,
        operator_id: &str,
        opening_amount: Money,
        lock_threshold_override: Option<Money>,
    ) -> ServiceResult<Register> {
        self.authorize(RegisterAction::OpenRegister, operator_id)?;
        validate_operator_id(operator_id).map_err(CoreError::from)?;
        validate_opening_amount(opening_amount).map_err(CoreError::from)?;

        let lock_threshold_cents = match lock_threshold_override {
            Some(threshold) => {
                validate_positive_amount("lock threshold", threshold).map_err(CoreError::from)?;
                Some(threshold.cents())
            }
            None => self.config.default_lock_threshold_cents,
        };

        let register = Register {
            id: Uuid::new_v4().to_string(),
            store_id: self.config.store_id.clone(),
            status: RegisterStatus::Open,
            opening_amount_cents: opening_amount.cents(),
            lock_threshold_cents,
            closing_amount_cents: None,
            notes: None,
            opened_by: operator_id.to_string(),
            closed_by: None,
            opened_at: Utc::now(),
            closed_at: None,
        };

        match self.db.registers().insert(&register).await {
            Ok(()) => {
                info!(
                    register_id = %register.id,
                    store_id = %register.store_id,
                    opening_amount_cents = register.opening_amount_cents,
                    "Register opened"
                );
                Ok(register)
            }
            Err(err) if err.is_unique_violation() => Err(CoreError::AlreadyOpen {
                store_id: self.config.store_id.clone(),
            }
            .into()),
            Err(err) => Err(err.into()),
        }
    }

    /// Finds the store's currently open register, if any.
    pub async fn current_register(&self) -> ServiceResult<Option<Register>> {
        Ok(self
            .db
            .registers()
            .find_open_for_store(&self.config.store_id)
            .await?)
    }

    /// Live balances of a register, folded from its ledger.
    pub async fn balances(&self, register_id: &str) -> ServiceResult<RegisterBalances> {
        let register = self.load_register(register_id).await?;
        self.derive_balances(&register).await
    }

    // =========================================================================
    // Money Movements
    // =========================================================================

    /// Records a finalized sale on the register, one ledger entry per tender.
    ///
    /// ## Preconditions (checked live, nothing written on failure)
    /// - the session exists, is active, and belongs to this register
    /// - the register is Open
    /// - the register is not locked (derived from the current ledger)
    /// - the collector's total is fully covered
    pub async fn record_sale(
        &self,
        register_id: &str,
        session_id: &str,
        collector: PaymentCollector,
    ) -> ServiceResult<SaleOutcome> {
        let session = self
            .db
            .sessions()
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("TerminalSession", session_id))?;
        if !session.is_active() || session.register_id != register_id {
            return Err(ServiceError::not_found("TerminalSession", session_id));
        }

        let register = self.load_open_register(register_id).await?;

        let balances = self.derive_balances(&register).await?;
        if balances.is_locked {
            warn!(
                register_id = %register.id,
                cash_balance_cents = balances.cash_balance_cents,
                "Sale rejected: register locked"
            );
            return Err(CoreError::RegisterLocked {
                register_id: register.id,
                cash_balance_cents: balances.cash_balance_cents,
                // is_locked implies a threshold is set
                threshold_cents: register.lock_threshold_cents.unwrap_or(0),
            }
            .into());
        }

        let reference_id = collector.reference_id().to_string();
        let tenders = collector.finalize()?;

        let mut entry_ids = Vec::with_capacity(tenders.len());
        let mut change_cents = 0;
        for tender in &tenders {
            let entry = LedgerEntry::sale(
                register_id,
                tender.method,
                tender.amount(),
                tender.change(),
                &reference_id,
                &session.operator_id,
            );
            self.db.ledger().append(&entry).await?;
            entry_ids.push(entry.id);
            change_cents += tender.change_cents;
        }

        info!(
            register_id = %register_id,
            reference_id = %reference_id,
            tenders = tenders.len(),
            change_cents,
            "Sale recorded"
        );

        let register = self.load_register(register_id).await?;
        let balances = self.derive_balances(&register).await?;

        Ok(SaleOutcome {
            entry_ids,
            change_cents,
            balances,
        })
    }

    /// Removes cash from the drawer (sangria).
    ///
    /// The live cash balance is re-derived first; a withdrawal above it is
    /// rejected with `InsufficientBalance` and nothing is written. This is
    /// also how a locked register is brought back under its threshold.
    pub async fn withdraw(
        &self,
        register_id: &str,
        operator_id: &str,
        amount: Money,
        reason: &str,
    ) -> ServiceResult<RegisterBalances> {
        self.authorize(RegisterAction::Withdrawal, operator_id)?;
        validate_positive_amount("withdrawal amount", amount).map_err(CoreError::from)?;
        validate_reason(reason).map_err(CoreError::from)?;

        let register = self.load_open_register(register_id).await?;

        let balances = self.derive_balances(&register).await?;
        if amount.cents() > balances.cash_balance_cents {
            return Err(CoreError::InsufficientBalance {
                requested_cents: amount.cents(),
                available_cents: balances.cash_balance_cents,
            }
            .into());
        }

        let entry = LedgerEntry::withdrawal(register_id, amount, reason, operator_id);
        self.db.ledger().append(&entry).await?;

        info!(
            register_id = %register_id,
            amount_cents = amount.cents(),
            reason,
            "Withdrawal recorded"
        );

        self.derive_balances(&register).await
    }

    /// Adds cash to the drawer (suprimento), e.g. change reinforcement.
    pub async fn deposit(
        &self,
        register_id: &str,
        operator_id: &str,
        amount: Money,
        reason: &str,
    ) -> ServiceResult<RegisterBalances> {
        self.authorize(RegisterAction::Deposit, operator_id)?;
        validate_positive_amount("deposit amount", amount).map_err(CoreError::from)?;
        validate_reason(reason).map_err(CoreError::from)?;

        let register = self.load_open_register(register_id).await?;

        let entry = LedgerEntry::deposit(register_id, amount, reason, operator_id);
        self.db.ledger().append(&entry).await?;

        info!(
            register_id = %register_id,
            amount_cents = amount.cents(),
            reason,
            "Deposit recorded"
        );

        self.derive_balances(&register).await
    }

    // =========================================================================
    // Close & Report
    // =========================================================================

    /// Closes the register, replaying the ledger into a reconciliation
    /// report that is persisted atomically with the status change.
    ///
    /// ## Close Race
    /// Two terminals closing concurrently both replay the ledger, but only
    /// one UPDATE matches `status = 'open'`. The loser gets `AlreadyClosed`
    /// and its report is discarded; exactly one report is ever stored.
    pub async fn close_register(
        &self,
        register_id: &str,
        operator_id: &str,
        counted_cash: Money,
        notes: Option<&str>,
    ) -> ServiceResult<ReconciliationReport> {
        self.authorize(RegisterAction::CloseRegister, operator_id)?;
        if counted_cash.is_negative() {
            return Err(CoreError::InvalidAmount {
                reason: format!("counted cash must not be negative, got {}", counted_cash.cents()),
            }
            .into());
        }

        let register = self.load_register(register_id).await?;
        if !register.is_open() {
            return Err(CoreError::AlreadyClosed {
                register_id: register_id.to_string(),
            }
            .into());
        }

        let entries = self.db.ledger().entries_for_register(register_id).await?;
        let closed_at = Utc::now();
        let report = ReconciliationReport::generate(&register, &entries, counted_cash, closed_at);

        let report_json = serde_json::to_string(&report)
            .map_err(|e| ServiceError::Storage(DbError::Internal(e.to_string())))?;

        match self
            .db
            .registers()
            .close(
                register_id,
                counted_cash.cents(),
                notes,
                operator_id,
                closed_at,
                &report_json,
            )
            .await
        {
            Ok(()) => {
                info!(
                    register_id = %register_id,
                    expected_cash_cents = report.expected_cash_cents,
                    counted_cash_cents = report.counted_cash_cents,
                    variance_cents = report.variance_cents,
                    "Register closed"
                );
                Ok(report)
            }
            Err(DbError::StalePrecondition { .. }) => Err(CoreError::AlreadyClosed {
                register_id: register_id.to_string(),
            }
            .into()),
            Err(err) => Err(err.into()),
        }
    }

    /// Loads the persisted reconciliation report of a closed register.
    ///
    /// ## Errors
    /// `NotFound` for an unknown register or one that is still open (the
    /// report only exists once the close transition has committed).
    pub async fn report(&self, register_id: &str) -> ServiceResult<ReconciliationReport> {
        let report_json = self
            .db
            .registers()
            .get_report_json(register_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("ReconciliationReport", register_id))?;

        let report = serde_json::from_str(&report_json)
            .map_err(|e| ServiceError::Storage(DbError::Internal(e.to_string())))?;
        Ok(report)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn authorize(&self, action: RegisterAction, operator_id: &str) -> ServiceResult<()> {
        if !self.gate.authorize(action, operator_id) {
            warn!(operator_id, action = action.label(), "Authorization denied");
            return Err(CoreError::Unauthorized {
                operator_id: operator_id.to_string(),
                action: action.label().to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn load_register(&self, register_id: &str) -> ServiceResult<Register> {
        self.db
            .registers()
            .get_by_id(register_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Register", register_id))
    }

    async fn load_open_register(&self, register_id: &str) -> ServiceResult<Register> {
        let register = self.load_register(register_id).await?;
        if !register.is_open() {
            return Err(CoreError::RegisterClosed {
                register_id: register_id.to_string(),
            }
            .into());
        }
        Ok(register)
    }

    async fn derive_balances(&self, register: &Register) -> ServiceResult<RegisterBalances> {
        let entries = self.db.ledger().entries_for_register(&register.id).await?;
        let totals = LedgerTotals::fold(&entries);
        Ok(RegisterBalances::derive(register, &totals))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AllowAll, StaticGate};
    use caixa_core::TenderMethod;
    use caixa_db::DbConfig;

    async fn service() -> RegisterService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        RegisterService::new(db, Arc::new(AllowAll), StoreConfig::default())
    }

    async fn service_with_gate(gate: Arc<dyn AuthorizationGate>) -> RegisterService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        RegisterService::new(db, gate, StoreConfig::default())
    }

    #[tokio::test]
    async fn test_open_register_once_per_store() {
        let svc = service().await;

        let register = svc
            .open_register("op-1", Money::from_cents(10_000), None)
            .await
            .unwrap();
        assert!(register.is_open());
        assert_eq!(register.opening_amount_cents, 10_000);

        let err = svc
            .open_register("op-2", Money::from_cents(5_000), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(CoreError::AlreadyOpen { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_rejects_negative_opening_amount() {
        let svc = service().await;
        let err = svc
            .open_register("op-1", Money::from_cents(-1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(_)));
    }

    #[tokio::test]
    async fn test_gate_refusal_writes_nothing() {
        let svc = service_with_gate(Arc::new(StaticGate::new(["manager-1"]))).await;

        let err = svc
            .open_register("cashier-1", Money::from_cents(10_000), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(CoreError::Unauthorized { .. })
        ));
        assert!(svc.current_register().await.unwrap().is_none());

        svc.open_register("manager-1", Money::from_cents(10_000), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_withdraw_checks_live_balance() {
        let svc = service().await;
        let register = svc
            .open_register("op-1", Money::from_cents(10_000), None)
            .await
            .unwrap();

        let err = svc
            .withdraw(&register.id, "op-1", Money::from_cents(20_000), "too much")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(CoreError::InsufficientBalance {
                requested_cents: 20_000,
                available_cents: 10_000,
            })
        ));

        // Rejection wrote nothing
        let balances = svc.balances(&register.id).await.unwrap();
        assert_eq!(balances.cash_balance_cents, 10_000);

        let balances = svc
            .withdraw(&register.id, "op-1", Money::from_cents(1_000), "bank run")
            .await
            .unwrap();
        assert_eq!(balances.cash_balance_cents, 9_000);
    }

    #[tokio::test]
    async fn test_deposit_raises_balance() {
        let svc = service().await;
        let register = svc
            .open_register("op-1", Money::from_cents(5_000), None)
            .await
            .unwrap();

        let balances = svc
            .deposit(&register.id, "op-1", Money::from_cents(2_500), "troco")
            .await
            .unwrap();
        assert_eq!(balances.cash_balance_cents, 7_500);
    }

    #[tokio::test]
    async fn test_close_register_reconciles_and_persists_report() {
        let svc = service().await;
        let register = svc
            .open_register("op-1", Money::from_cents(10_000), None)
            .await
            .unwrap();

        svc.withdraw(&register.id, "op-1", Money::from_cents(1_000), "sangria")
            .await
            .unwrap();

        let report = svc
            .close_register(&register.id, "op-1", Money::from_cents(9_000), Some("ok"))
            .await
            .unwrap();
        assert_eq!(report.expected_cash_cents, 9_000);
        assert!(report.is_balanced());

        // Report is persisted and reloadable
        let reloaded = svc.report(&register.id).await.unwrap();
        assert_eq!(reloaded, report);

        // Second close observes AlreadyClosed
        let err = svc
            .close_register(&register.id, "op-1", Money::zero(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(CoreError::AlreadyClosed { .. })
        ));
    }

    #[tokio::test]
    async fn test_report_of_open_register_is_not_found() {
        let svc = service().await;
        let register = svc
            .open_register("op-1", Money::from_cents(10_000), None)
            .await
            .unwrap();

        let err = svc.report(&register.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_mutations_on_closed_register_are_rejected() {
        let svc = service().await;
        let register = svc
            .open_register("op-1", Money::from_cents(10_000), None)
            .await
            .unwrap();
        svc.close_register(&register.id, "op-1", Money::from_cents(10_000), None)
            .await
            .unwrap();

        let err = svc
            .deposit(&register.id, "op-1", Money::from_cents(100), "late")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(CoreError::RegisterClosed { .. })
        ));
    }

    #[tokio::test]
    async fn test_record_sale_requires_active_session() {
        let svc = service().await;
        let register = svc
            .open_register("op-1", Money::from_cents(10_000), None)
            .await
            .unwrap();

        let mut collector =
            PaymentCollector::new(Money::from_cents(3_500), "order-1").unwrap();
        collector
            .add_tender(TenderMethod::Cash, Money::from_cents(3_500))
            .unwrap();

        let err = svc
            .record_sale(&register.id, "no-such-session", collector)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }
}
