//! Domain model for the tutor roster.
//!
//! # Responsibility
//! - Define the canonical value records: syllabus topic, subject, student
//!   and the roster aggregate.
//! - Keep every record immutable in spirit: edits produce replacement
//!   values, never in-place graph mutation.
//!
//! # Invariants
//! - Every student is identified by a stable `StudentId`.
//! - Structural invariants (non-empty subject sets, no duplicate topics or
//!   subjects) are enforced at construction and on every edit path.

pub mod roster;
pub mod student;
pub mod subject;
pub mod topic;
