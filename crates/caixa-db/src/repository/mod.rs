//! # Repository Module
//!
//! Database repository implementations for the register engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Service Layer                                                         │
//! │       │                                                                 │
//! │       │  db.ledger().entries_for_register(id)                          │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  LedgerRepository                                                      │
//! │  ├── append(&self, entry)                                              │
//! │  ├── entries_for_register(&self, register_id)                          │
//! │  └── entries_for_reference(&self, reference_id)                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (in-memory database per test)                          │
//! │  • SQL is isolated in one place                                        │
//! │  • Concurrency invariants live next to the statements enforcing them   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`register::RegisterRepository`] - Register lifecycle (open, close, lookup)
//! - [`ledger::LedgerRepository`] - Append-only operation ledger
//! - [`session::SessionRepository`] - Terminal session occupancy

pub mod ledger;
pub mod register;
pub mod session;
