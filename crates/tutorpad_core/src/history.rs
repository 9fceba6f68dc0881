//! Versioned roster history.
//!
//! # Responsibility
//! - Keep the linear sequence of full roster snapshots for one session.
//! - Move the cursor for undo/redo without touching the edit engine.
//!
//! # Invariants
//! - The snapshot sequence is never empty; index 0 is the initial load.
//! - `0 <= cursor < snapshots.len()` at all times.
//! - `commit` truncates every snapshot after the cursor before appending,
//!   so redo state never survives a new edit.

use crate::model::roster::Roster;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// History-boundary failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    /// Undo requested at the oldest snapshot.
    NoPreviousState,
    /// Redo requested at the newest snapshot.
    NoNextState,
}

impl Display for HistoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPreviousState => write!(f, "no earlier roster state to restore"),
            Self::NoNextState => write!(f, "no later roster state to restore"),
        }
    }
}

impl Error for HistoryError {}

/// Linear, truncate-on-branch sequence of full roster snapshots.
///
/// Full snapshots rather than inverse operations: memory is traded for
/// undo/redo that cannot drift from the actual roster state.
#[derive(Debug, Clone)]
pub struct RosterHistory {
    snapshots: Vec<Roster>,
    cursor: usize,
}

impl RosterHistory {
    /// Starts history at the initially loaded roster.
    pub fn new(initial: Roster) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
        }
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> &Roster {
        &self.snapshots[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Records a new snapshot after a successful edit.
    ///
    /// Discards every snapshot after the cursor, appends a clone of
    /// `snapshot` and advances the cursor to the new tail. Never fails.
    pub fn commit(&mut self, snapshot: &Roster) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot.clone());
        self.cursor = self.snapshots.len() - 1;
    }

    /// Steps the cursor back and returns that snapshot.
    ///
    /// # Errors
    /// - `NoPreviousState` at the oldest snapshot.
    pub fn undo(&mut self) -> Result<&Roster, HistoryError> {
        if !self.can_undo() {
            return Err(HistoryError::NoPreviousState);
        }
        self.cursor -= 1;
        Ok(&self.snapshots[self.cursor])
    }

    /// Steps the cursor forward and returns that snapshot.
    ///
    /// # Errors
    /// - `NoNextState` at the newest snapshot.
    pub fn redo(&mut self) -> Result<&Roster, HistoryError> {
        if !self.can_redo() {
            return Err(HistoryError::NoNextState);
        }
        self.cursor += 1;
        Ok(&self.snapshots[self.cursor])
    }
}
