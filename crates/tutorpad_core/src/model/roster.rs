//! Roster aggregate.
//!
//! # Responsibility
//! - Hold the ordered collection of student records for one session.
//! - Enforce identity-based uniqueness on every mutation path.
//!
//! # Invariants
//! - No two students satisfy `is_same_student`.
//! - Order is insertion order; replacement preserves the slot.
//! - Mutation happens only through `add_student` / `replace_student` /
//!   `delete_student` / `reset_to`.

use crate::model::student::Student;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures from roster-level mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// A record with the same identity fields already exists.
    DuplicateStudent(String),
    /// Target record is absent. Under the single-session model this
    /// signals a programming error, not a user-recoverable condition.
    StudentNotFound(String),
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateStudent(name) => {
                write!(f, "roster already contains student `{name}`")
            }
            Self::StudentNotFound(name) => {
                write!(f, "student not found in roster: `{name}`")
            }
        }
    }
}

impl Error for RosterError {}

/// Ordered collection of student records, unique by identity fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    /// Empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a roster from pre-loaded records, rejecting identity
    /// collisions. Used by load paths.
    pub fn from_students(students: Vec<Student>) -> Result<Self, RosterError> {
        let mut roster = Self::new();
        for student in students {
            roster.add_student(student)?;
        }
        Ok(roster)
    }

    /// Students in display order.
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Identity-based membership test.
    pub fn contains(&self, student: &Student) -> bool {
        self.students
            .iter()
            .any(|existing| existing.is_same_student(student))
    }

    /// Appends a new record.
    ///
    /// # Errors
    /// - `DuplicateStudent` on identity collision.
    pub fn add_student(&mut self, student: Student) -> Result<(), RosterError> {
        if self.contains(&student) {
            return Err(RosterError::DuplicateStudent(student.name().to_string()));
        }
        self.students.push(student);
        Ok(())
    }

    /// Identity-preserving positional replacement of `old` with `new`.
    ///
    /// # Errors
    /// - `StudentNotFound` when `old` is absent.
    /// - `DuplicateStudent` when `new` collides with a record other than
    ///   the one being replaced.
    pub fn replace_student(&mut self, old: &Student, new: Student) -> Result<(), RosterError> {
        let slot = self
            .students
            .iter()
            .position(|existing| existing.is_same_student(old))
            .ok_or_else(|| RosterError::StudentNotFound(old.name().to_string()))?;

        let collides = self
            .students
            .iter()
            .enumerate()
            .any(|(position, existing)| position != slot && existing.is_same_student(&new));
        if collides {
            return Err(RosterError::DuplicateStudent(new.name().to_string()));
        }

        self.students[slot] = new;
        Ok(())
    }

    /// Removes a record by identity.
    ///
    /// # Errors
    /// - `StudentNotFound` when no record matches.
    pub fn delete_student(&mut self, student: &Student) -> Result<(), RosterError> {
        let slot = self
            .students
            .iter()
            .position(|existing| existing.is_same_student(student))
            .ok_or_else(|| RosterError::StudentNotFound(student.name().to_string()))?;
        self.students.remove(slot);
        Ok(())
    }

    /// Wholesale replacement. Used by clear, undo and redo.
    pub fn reset_to(&mut self, roster: Roster) {
        self.students = roster.students;
    }
}
