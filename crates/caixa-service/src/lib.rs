//! # caixa-service: Orchestration Layer for the Register Engine
//!
//! Wires the pure logic of `caixa-core` to the persistence of `caixa-db`
//! and presents the operations terminals actually call.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Register Engine Layers                             │
//! │                                                                         │
//! │  Embedding App (desktop shell, HTTP server, ...)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  caixa-service (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   RegisterService          SessionService                       │   │
//! │  │   ├── open_register        ├── start_session (resume)           │   │
//! │  │   ├── record_sale          ├── end_session (idempotent)         │   │
//! │  │   ├── withdraw / deposit   └── active_sessions                  │   │
//! │  │   ├── balances                                                  │   │
//! │  │   ├── close_register       AuthorizationGate (trait)            │   │
//! │  │   └── report               StoreConfig · render_report          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                              │                                  │
//! │       ▼                              ▼                                  │
//! │  caixa-core (pure math)         caixa-db (SQLite)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use caixa_core::{Money, PaymentCollector, TenderMethod};
//! use caixa_db::{Database, DbConfig};
//! use caixa_service::{AllowAll, RegisterService, SessionService, StoreConfig};
//!
//! let db = Database::new(DbConfig::new("caixa.db")).await?;
//! let registers = RegisterService::new(db.clone(), Arc::new(AllowAll), StoreConfig::from_env());
//! let sessions = SessionService::new(db);
//!
//! let register = registers.open_register("op-1", Money::from_cents(10_000), None).await?;
//! let session = sessions.start_session(&register.id, "Balcão 1", "op-1").await?;
//!
//! let mut collector = PaymentCollector::new(Money::from_cents(3_500), "order-1")?;
//! collector.add_tender(TenderMethod::Cash, Money::from_cents(5_000))?;
//! let outcome = registers.record_sale(&register.id, &session.id, collector).await?;
//! println!("change due: {}", outcome.change_cents);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod config;
pub mod error;
pub mod registers;
pub mod render;
pub mod sessions;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{AllowAll, AuthorizationGate, RegisterAction, StaticGate};
pub use config::StoreConfig;
pub use error::{ServiceError, ServiceResult};
pub use registers::{RegisterService, SaleOutcome};
pub use render::render_report;
pub use sessions::SessionService;
