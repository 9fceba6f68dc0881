//! Core domain logic for TutorPad.
//! This crate is the single source of truth for roster invariants.

pub mod db;
pub mod history;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use history::{HistoryError, RosterHistory};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::roster::{Roster, RosterError};
pub use model::student::{
    Payment, Student, StudentDetails, StudentEditError, StudentId, StudentValidationError,
};
pub use model::subject::{Subject, SubjectEditError, SubjectValidationError};
pub use model::topic::{SyllabusTopic, TopicValidationError};
pub use repo::roster_store::{RosterStore, SqliteRosterStore, StoreError, StoreResult};
pub use service::command_service::{
    CommandError, CommandOutcome, CommandService, EditCommand, NewStudent, StudentFieldEdits,
};
pub use view::StudentFilter;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
