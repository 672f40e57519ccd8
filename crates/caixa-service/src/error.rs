//! # Service Error Type
//!
//! Unified error type for the orchestration layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Error Flow in the Register Engine                     │
//! │                                                                         │
//! │  Terminal / Embedding App         Service Layer                         │
//! │  ────────────────────────         ─────────────                         │
//! │                                                                         │
//! │  record_sale(...)                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service method                                                  │  │
//! │  │  Result<T, ServiceError>                                         │  │
//! │  │         │                                                        │  │
//! │  │         ├── Rule violation?  CoreError ──► Domain(..)            │  │
//! │  │  (register locked, insufficient balance — do NOT retry)          │  │
//! │  │         │                                                        │  │
//! │  │         ├── Missing entity?  ──► NotFound { .. }                 │  │
//! │  │         │                                                        │  │
//! │  │         └── Persistence?     DbError ──► Storage(..)             │  │
//! │  │  (transient — safe to retry with the SAME entry id; the ledger   │  │
//! │  │   id doubles as the idempotency key)                             │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The three-way split is the contract: `Domain` errors are user-facing and
//! final, `Storage` errors are retryable, `NotFound` is a caller bug or a
//! stale id.

use caixa_core::CoreError;
use caixa_db::DbError;
use thiserror::Error;

/// Errors returned by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A business rule rejected the operation. Final; do not retry.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The persistence layer failed. Transient; retry with the same
    /// ledger entry id.
    #[error("storage error: {0}")]
    Storage(#[from] DbError),
}

impl ServiceError {
    /// Creates a NotFound error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// True if the operation may be retried with the same inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Storage(_))
    }
}

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
