//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate model edits, history commits and store hand-offs into
//!   command-level APIs.
//! - Keep presentation and input layers decoupled from domain details.

pub mod command_service;
