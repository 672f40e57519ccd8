//! # Register Repository
//!
//! Database operations for registers (tills).
//!
//! ## Register Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Register Lifecycle                                 │
//! │                                                                         │
//! │  1. OPEN                                                               │
//! │     └── insert() → Register { status: Open }                           │
//! │         (second open for the store → UNIQUE violation on               │
//! │          idx_registers_single_open → caller maps to AlreadyOpen)       │
//! │                                                                         │
//! │  2. SHIFT                                                              │
//! │     └── no register writes at all; everything is ledger appends        │
//! │                                                                         │
//! │  3. CLOSE                                                              │
//! │     └── close() → compare-and-set:                                     │
//! │         UPDATE ... WHERE id = ? AND status = 'open'                    │
//! │         0 rows affected → the register was already closed; the         │
//! │         losing closer gets StalePrecondition, no second report stored  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use caixa_core::{Register, RegisterStatus};

/// Repository for register database operations.
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
}

impl RegisterRepository {
    /// Creates a new RegisterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegisterRepository { pool }
    }

    /// Inserts a newly opened register.
    ///
    /// ## Single-Open Invariant
    /// The partial unique index on `(store_id) WHERE status = 'open'` makes
    /// this insert the atomic "is another register open?" check. The caller
    /// maps [`DbError::UniqueViolation`] to `AlreadyOpen`.
    pub async fn insert(&self, register: &Register) -> DbResult<()> {
        debug!(id = %register.id, store_id = %register.store_id, "Inserting register");

        sqlx::query(
            r#"
            INSERT INTO registers (
                id, store_id, status,
                opening_amount_cents, lock_threshold_cents,
                closing_amount_cents, notes,
                opened_by, closed_by, opened_at, closed_at,
                report_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, NULL)
            "#,
        )
        .bind(&register.id)
        .bind(&register.store_id)
        .bind(register.status)
        .bind(register.opening_amount_cents)
        .bind(register.lock_threshold_cents)
        .bind(register.closing_amount_cents)
        .bind(&register.notes)
        .bind(&register.opened_by)
        .bind(&register.closed_by)
        .bind(register.opened_at)
        .bind(register.closed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a register by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Register>> {
        let register: Option<Register> = sqlx::query_as(
            r#"
            SELECT
                id, store_id, status,
                opening_amount_cents, lock_threshold_cents,
                closing_amount_cents, notes,
                opened_by, closed_by, opened_at, closed_at
            FROM registers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(register)
    }

    /// Finds the currently open register for a store, if any.
    ///
    /// The explicit replacement for an ambient "current register" global:
    /// terminals resolve the register id once per session via this lookup.
    pub async fn find_open_for_store(&self, store_id: &str) -> DbResult<Option<Register>> {
        let register: Option<Register> = sqlx::query_as(
            r#"
            SELECT
                id, store_id, status,
                opening_amount_cents, lock_threshold_cents,
                closing_amount_cents, notes,
                opened_by, closed_by, opened_at, closed_at
            FROM registers
            WHERE store_id = ?1 AND status = 'open'
            "#,
        )
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(register)
    }

    /// Closes a register with an atomic compare-and-set on status.
    ///
    /// ## Why Compare-and-Set
    /// Two terminals may try to close concurrently. The `status = 'open'`
    /// condition lets exactly one UPDATE win; the loser matches 0 rows and
    /// gets [`DbError::StalePrecondition`], which the service maps to
    /// `AlreadyClosed`. The winner's reconciliation report is persisted in
    /// the same statement, so a closed register and its report are atomic.
    #[allow(clippy::too_many_arguments)]
    pub async fn close(
        &self,
        id: &str,
        closing_amount_cents: i64,
        notes: Option<&str>,
        closed_by: &str,
        closed_at: DateTime<Utc>,
        report_json: &str,
    ) -> DbResult<()> {
        debug!(id = %id, closing_amount_cents, "Closing register");

        let result = sqlx::query(
            r#"
            UPDATE registers SET
                status = ?2,
                closing_amount_cents = ?3,
                notes = ?4,
                closed_by = ?5,
                closed_at = ?6,
                report_json = ?7
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(id)
        .bind(RegisterStatus::Closed)
        .bind(closing_amount_cents)
        .bind(notes)
        .bind(closed_by)
        .bind(closed_at)
        .bind(report_json)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale("Register", id, "status = open"));
        }

        Ok(())
    }

    /// Gets the persisted reconciliation report JSON of a closed register.
    ///
    /// Returns `None` while the register is still open (the report is
    /// written only by the close transition).
    pub async fn get_report_json(&self, id: &str) -> DbResult<Option<String>> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT report_json FROM registers WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            None => Err(DbError::not_found("Register", id)),
            Some((report,)) => Ok(report),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use caixa_core::RegisterStatus;
    use uuid::Uuid;

    fn test_register(store_id: &str) -> Register {
        Register {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            status: RegisterStatus::Open,
            opening_amount_cents: 10_000,
            lock_threshold_cents: None,
            closing_amount_cents: None,
            notes: None,
            opened_by: "op-1".to_string(),
            closed_by: None,
            opened_at: Utc::now(),
            closed_at: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let register = test_register("store-1");

        db.registers().insert(&register).await.unwrap();

        let loaded = db.registers().get_by_id(&register.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, register.id);
        assert_eq!(loaded.status, RegisterStatus::Open);
        assert_eq!(loaded.opening_amount_cents, 10_000);
        assert!(loaded.closing_amount_cents.is_none());
    }

    #[tokio::test]
    async fn test_single_open_invariant() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.registers().insert(&test_register("store-1")).await.unwrap();

        // Second open register for the same store hits the partial index
        let err = db.registers().insert(&test_register("store-1")).await.unwrap_err();
        assert!(err.is_unique_violation());

        // A different store is unaffected
        db.registers().insert(&test_register("store-2")).await.unwrap();
    }

    #[tokio::test]
    async fn test_close_is_compare_and_set() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let register = test_register("store-1");
        db.registers().insert(&register).await.unwrap();

        db.registers()
            .close(&register.id, 12_500, Some("ok"), "op-2", Utc::now(), "{}")
            .await
            .unwrap();

        let closed = db.registers().get_by_id(&register.id).await.unwrap().unwrap();
        assert_eq!(closed.status, RegisterStatus::Closed);
        assert_eq!(closed.closing_amount_cents, Some(12_500));
        assert_eq!(closed.closed_by.as_deref(), Some("op-2"));

        // Losing a close race: precondition no longer holds
        let err = db
            .registers()
            .close(&register.id, 99_999, None, "op-3", Utc::now(), "{}")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::StalePrecondition { .. }));

        // And the first close's data is untouched
        let still = db.registers().get_by_id(&register.id).await.unwrap().unwrap();
        assert_eq!(still.closing_amount_cents, Some(12_500));
        assert_eq!(still.closed_by.as_deref(), Some("op-2"));
    }

    #[tokio::test]
    async fn test_reopening_after_close_is_allowed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let first = test_register("store-1");
        db.registers().insert(&first).await.unwrap();
        db.registers()
            .close(&first.id, 10_000, None, "op-1", Utc::now(), "{}")
            .await
            .unwrap();

        // The partial index only guards open registers
        db.registers().insert(&test_register("store-1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_open_for_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.registers().find_open_for_store("store-1").await.unwrap().is_none());

        let register = test_register("store-1");
        db.registers().insert(&register).await.unwrap();

        let found = db.registers().find_open_for_store("store-1").await.unwrap().unwrap();
        assert_eq!(found.id, register.id);
    }

    #[tokio::test]
    async fn test_report_json_lifecycle() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let register = test_register("store-1");
        db.registers().insert(&register).await.unwrap();

        // No report while open
        assert!(db.registers().get_report_json(&register.id).await.unwrap().is_none());

        db.registers()
            .close(&register.id, 10_000, None, "op-1", Utc::now(), r#"{"v":1}"#)
            .await
            .unwrap();

        let report = db.registers().get_report_json(&register.id).await.unwrap();
        assert_eq!(report.as_deref(), Some(r#"{"v":1}"#));

        // Unknown register is NotFound, not None
        let err = db.registers().get_report_json("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
