//! # Terminal Session Service
//!
//! Start, resume, and end terminal sessions on an open register.
//!
//! ## Resume Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              start_session Is Idempotent Per Operator                   │
//! │                                                                         │
//! │  start_session(reg, "Balcão 1", op-7)                                   │
//! │       │                                                                 │
//! │       ├── active session for op-7 on reg?  ──► return it as-is          │
//! │       │        (a crashed tab reconnecting resumes, never duplicates)   │
//! │       │                                                                 │
//! │       ├── none: insert new session                                      │
//! │       │        │                                                        │
//! │       │        ├── ok ──► return the new session                        │
//! │       │        │                                                        │
//! │       │        └── UNIQUE violation (lost a start race)                 │
//! │       │                 └── re-fetch the winner and resume it           │
//! │       ▼                                                                 │
//! │  Terminal names are display labels from the configured pool, never     │
//! │  reserved: two operators may both sit at "Balcão 1".                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use caixa_core::{validate_operator_id, validate_terminal_name, CoreError, TerminalSession};
use caixa_db::{Database, DbError};

use crate::error::{ServiceError, ServiceResult};

/// Service for terminal session occupancy on registers.
#[derive(Clone)]
pub struct SessionService {
    db: Database,
}

impl SessionService {
    /// Creates a session service.
    pub fn new(db: Database) -> Self {
        SessionService { db }
    }

    /// Starts a session for an operator on an open register, resuming the
    /// operator's existing active session if there is one.
    ///
    /// ## Errors
    /// - `Validation` - empty or overlong terminal name
    /// - `NotFound` - unknown register
    /// - `RegisterClosed` - register exists but is closed
    /// - `DuplicateSession` - defensive guard if the insert race loser
    ///   cannot re-fetch the winner (should not occur)
    pub async fn start_session(
        &self,
        register_id: &str,
        terminal_name: &str,
        operator_id: &str,
    ) -> ServiceResult<TerminalSession> {
        validate_terminal_name(terminal_name).map_err(CoreError::from)?;
        validate_operator_id(operator_id).map_err(CoreError::from)?;

        let register = self
            .db
            .registers()
            .get_by_id(register_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Register", register_id))?;
        if !register.is_open() {
            return Err(CoreError::RegisterClosed {
                register_id: register_id.to_string(),
            }
            .into());
        }

        if let Some(active) = self
            .db
            .sessions()
            .find_active_for_operator(register_id, operator_id)
            .await?
        {
            info!(
                session_id = %active.id,
                operator_id,
                "Resuming active terminal session"
            );
            return Ok(active);
        }

        let session = TerminalSession {
            id: Uuid::new_v4().to_string(),
            register_id: register_id.to_string(),
            terminal_name: terminal_name.to_string(),
            operator_id: operator_id.to_string(),
            started_at: Utc::now(),
            ended_at: None,
        };

        match self.db.sessions().insert(&session).await {
            Ok(()) => {
                info!(
                    session_id = %session.id,
                    register_id,
                    terminal_name,
                    operator_id,
                    "Terminal session started"
                );
                Ok(session)
            }
            Err(err) if err.is_unique_violation() => {
                // Lost a concurrent start race; resume the winner
                self.db
                    .sessions()
                    .find_active_for_operator(register_id, operator_id)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::Domain(CoreError::DuplicateSession {
                            register_id: register_id.to_string(),
                            operator_id: operator_id.to_string(),
                        })
                    })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Ends a session. Idempotent: ending an already-ended session is a
    /// no-op success.
    pub async fn end_session(&self, session_id: &str) -> ServiceResult<()> {
        // Distinguish "never existed" from "already ended"
        let session = self
            .db
            .sessions()
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("TerminalSession", session_id))?;

        if !session.is_active() {
            return Ok(());
        }

        match self.db.sessions().end(session_id, Utc::now()).await {
            Ok(()) => {
                info!(session_id, "Terminal session ended");
                Ok(())
            }
            // Concurrent end won the compare-and-set; same outcome
            Err(DbError::StalePrecondition { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Lists the active sessions on a register (occupancy view).
    pub async fn active_sessions(&self, register_id: &str) -> ServiceResult<Vec<TerminalSession>> {
        Ok(self.db.sessions().active_for_register(register_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use caixa_core::{Money, RegisterStatus};
    use caixa_db::DbConfig;

    async fn setup() -> (SessionService, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let register = caixa_core::Register {
            id: Uuid::new_v4().to_string(),
            store_id: "store-1".to_string(),
            status: RegisterStatus::Open,
            opening_amount_cents: Money::from_cents(10_000).cents(),
            lock_threshold_cents: None,
            closing_amount_cents: None,
            notes: None,
            opened_by: "op-1".to_string(),
            closed_by: None,
            opened_at: Utc::now(),
            closed_at: None,
        };
        db.registers().insert(&register).await.unwrap();
        (SessionService::new(db), register.id)
    }

    #[tokio::test]
    async fn test_start_and_resume() {
        let (svc, register_id) = setup().await;

        let first = svc
            .start_session(&register_id, "Balcão 1", "op-1")
            .await
            .unwrap();

        // Second start by the same operator resumes, even from another terminal
        let resumed = svc
            .start_session(&register_id, "Balcão 2", "op-1")
            .await
            .unwrap();
        assert_eq!(resumed.id, first.id);
        assert_eq!(resumed.terminal_name, "Balcão 1");
    }

    #[tokio::test]
    async fn test_two_operators_share_a_terminal_label() {
        let (svc, register_id) = setup().await;

        svc.start_session(&register_id, "Balcão 1", "op-1").await.unwrap();
        svc.start_session(&register_id, "Balcão 1", "op-2").await.unwrap();

        let active = svc.active_sessions(&register_id).await.unwrap();
        assert_eq!(active.len(), 2);
    }

    #[tokio::test]
    async fn test_end_session_is_idempotent() {
        let (svc, register_id) = setup().await;
        let session = svc
            .start_session(&register_id, "Balcão 1", "op-1")
            .await
            .unwrap();

        svc.end_session(&session.id).await.unwrap();
        // Ending again is a no-op success
        svc.end_session(&session.id).await.unwrap();

        // And the operator may start fresh
        let next = svc
            .start_session(&register_id, "Balcão 1", "op-1")
            .await
            .unwrap();
        assert_ne!(next.id, session.id);
    }

    #[tokio::test]
    async fn test_end_unknown_session_is_not_found() {
        let (svc, _) = setup().await;
        let err = svc.end_session("no-such-session").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_terminal_name() {
        let (svc, register_id) = setup().await;
        let err = svc
            .start_session(&register_id, "", "op-1")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(_)));
    }

    #[tokio::test]
    async fn test_start_on_unknown_register() {
        let (svc, _) = setup().await;
        let err = svc
            .start_session("missing", "Balcão 1", "op-1")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }
}
