//! # caixa-db: Database Layer for the Register Engine
//!
//! This crate provides database access for the caixa register engine.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Register Engine Data Flow                          │
//! │                                                                         │
//! │  Service Call (record_sale, close_register, ...)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     caixa-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (register.rs) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ RegisterRepo  │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ LedgerRepo    │    │ ...          │  │   │
//! │  │   │ Management    │    │ SessionRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │   registers · ledger_entries · terminal_sessions               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants Enforced Here
//!
//! The schema carries the invariants that must survive concurrent terminals:
//!
//! - **Single open register per store**: partial unique index on
//!   `registers(store_id) WHERE status = 'open'`
//! - **One active session per operator per register**: partial unique index on
//!   `terminal_sessions(register_id, operator_id) WHERE ended_at IS NULL`
//! - **Close-once**: compare-and-set `UPDATE ... WHERE status = 'open'`
//! - **Append-only ledger**: no UPDATE or DELETE statement exists for
//!   `ledger_entries`
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (register, ledger, session)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caixa_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let config = DbConfig::new("path/to/caixa.db");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! let entries = db.ledger().entries_for_register(&register_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::ledger::LedgerRepository;
pub use repository::register::RegisterRepository;
pub use repository::session::SessionRepository;
