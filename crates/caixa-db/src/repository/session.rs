//! # Terminal Session Repository
//!
//! Database operations for terminal sessions.
//!
//! ## Concurrency Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Same Operator, Two Tabs, One Session                       │
//! │                                                                         │
//! │  Tab 1: find_active? none ──► insert ✓                                 │
//! │  Tab 2: find_active? none ──► insert ✗ UNIQUE violation                │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │              service re-fetches and resumes Tab 1's session            │
//! │                                                                         │
//! │  The partial index on (register_id, operator_id) WHERE ended_at IS     │
//! │  NULL makes the insert itself the duplicate check.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use caixa_core::TerminalSession;

/// Repository for terminal session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Inserts a new session.
    ///
    /// A concurrent start by the same operator loses this insert with
    /// [`DbError::UniqueViolation`]; the caller re-fetches the winner and
    /// resumes it.
    pub async fn insert(&self, session: &TerminalSession) -> DbResult<()> {
        debug!(
            id = %session.id,
            register_id = %session.register_id,
            terminal_name = %session.terminal_name,
            operator_id = %session.operator_id,
            "Inserting terminal session"
        );

        sqlx::query(
            r#"
            INSERT INTO terminal_sessions (
                id, register_id, terminal_name, operator_id, started_at, ended_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&session.id)
        .bind(&session.register_id)
        .bind(&session.terminal_name)
        .bind(&session.operator_id)
        .bind(session.started_at)
        .bind(session.ended_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TerminalSession>> {
        let session: Option<TerminalSession> = sqlx::query_as(
            r#"
            SELECT id, register_id, terminal_name, operator_id, started_at, ended_at
            FROM terminal_sessions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Finds the operator's active session on a register, if any.
    pub async fn find_active_for_operator(
        &self,
        register_id: &str,
        operator_id: &str,
    ) -> DbResult<Option<TerminalSession>> {
        let session: Option<TerminalSession> = sqlx::query_as(
            r#"
            SELECT id, register_id, terminal_name, operator_id, started_at, ended_at
            FROM terminal_sessions
            WHERE register_id = ?1 AND operator_id = ?2 AND ended_at IS NULL
            "#,
        )
        .bind(register_id)
        .bind(operator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Lists all active sessions on a register (terminal occupancy view).
    pub async fn active_for_register(&self, register_id: &str) -> DbResult<Vec<TerminalSession>> {
        let sessions: Vec<TerminalSession> = sqlx::query_as(
            r#"
            SELECT id, register_id, terminal_name, operator_id, started_at, ended_at
            FROM terminal_sessions
            WHERE register_id = ?1 AND ended_at IS NULL
            ORDER BY started_at
            "#,
        )
        .bind(register_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Ends a session with a compare-and-set on `ended_at IS NULL`.
    ///
    /// 0 rows affected means the session was already ended; reported as
    /// [`DbError::StalePrecondition`] so the service can treat a repeated
    /// end as an idempotent success.
    pub async fn end(&self, id: &str, ended_at: DateTime<Utc>) -> DbResult<()> {
        debug!(id = %id, "Ending terminal session");

        let result = sqlx::query(
            r#"
            UPDATE terminal_sessions SET ended_at = ?2
            WHERE id = ?1 AND ended_at IS NULL
            "#,
        )
        .bind(id)
        .bind(ended_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::stale("TerminalSession", id, "ended_at IS NULL"));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
