//! # Ledger Repository
//!
//! Database operations for the append-only operation ledger.
//!
//! ## Append-Only Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    The Only Mutation Is INSERT                          │
//! │                                                                         │
//! │  Terminal A ──► append(Sale cash 35.00)   ┐  independent inserts,      │
//! │  Terminal B ──► append(Sale pix  20.00)   ┘  no shared counter,        │
//! │                                              no lost updates           │
//! │                                                                         │
//! │  Any reader ──► entries_for_register() ──► fold in caixa-core          │
//! │                                                                         │
//! │  There is NO update_balance(), NO delete_entry(). Corrections are      │
//! │  new entries; balances are derived on read.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Retry Safety
//! The entry id is caller-supplied (generated in caixa-core constructors).
//! A retried append after a transient failure either succeeds (the first
//! attempt never landed) or surfaces a unique violation (it did land) —
//! never a duplicated money movement.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use caixa_core::LedgerEntry;

/// Repository for ledger database operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Appends one entry to the ledger. Pure insert, no read-modify-write.
    pub async fn append(&self, entry: &LedgerEntry) -> DbResult<()> {
        debug!(
            id = %entry.id,
            register_id = %entry.register_id,
            kind = ?entry.kind,
            amount_cents = entry.amount_cents,
            "Appending ledger entry"
        );

        sqlx::query(
            r#"
            INSERT INTO ledger_entries (
                id, register_id, kind, tender_method,
                amount_cents, change_cents,
                reference_id, reason, operator_id, recorded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.register_id)
        .bind(entry.kind)
        .bind(entry.tender_method)
        .bind(entry.amount_cents)
        .bind(entry.change_cents)
        .bind(&entry.reference_id)
        .bind(&entry.reason)
        .bind(&entry.operator_id)
        .bind(entry.recorded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets all entries for a register, in recorded order.
    ///
    /// This is the input to every balance fold and to the close-time
    /// reconciliation replay. O(n) per shift, and a shift is hundreds of
    /// entries, not millions.
    pub async fn entries_for_register(&self, register_id: &str) -> DbResult<Vec<LedgerEntry>> {
        let entries: Vec<LedgerEntry> = sqlx::query_as(
            r#"
            SELECT
                id, register_id, kind, tender_method,
                amount_cents, change_cents,
                reference_id, reason, operator_id, recorded_at
            FROM ledger_entries
            WHERE register_id = ?1
            ORDER BY recorded_at, id
            "#,
        )
        .bind(register_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Gets all entries recorded for one external sale/order id.
    ///
    /// A split-tender sale produces several entries sharing one
    /// `reference_id`; this is how the order layer audits what the till
    /// actually collected.
    pub async fn entries_for_reference(&self, reference_id: &str) -> DbResult<Vec<LedgerEntry>> {
        let entries: Vec<LedgerEntry> = sqlx::query_as(
            r#"
            SELECT
                id, register_id, kind, tender_method,
                amount_cents, change_cents,
                reference_id, reason, operator_id, recorded_at
            FROM ledger_entries
            WHERE reference_id = ?1
            ORDER BY recorded_at, id
            "#,
        )
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Counts entries for a register.
    pub async fn count_for_register(&self, register_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries WHERE register_id = ?1")
                .bind(register_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
