//! Persistence layer abstractions and implementations.
//!
//! # Responsibility
//! - Define the roster persistence contract consumed by the command layer.
//! - Isolate SQLite query details from domain and service code.
//!
//! # Invariants
//! - Store reads rebuild records through the validating model factories.
//! - Store writes replace the persisted roster wholesale and atomically.

pub mod roster_store;
