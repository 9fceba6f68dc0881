//! Displayed-view filtering.
//!
//! # Responsibility
//! - Materialize the "currently displayed sequence of students" that the
//!   command layer resolves 1-based indices against.
//!
//! # Invariants
//! - Filtering never reorders: the displayed sequence preserves roster
//!   order.
//! - Keyword matching is case-insensitive and word-level against the
//!   student name.

use crate::model::roster::Roster;
use crate::model::student::Student;

/// Active filter over the roster's display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentFilter {
    /// Every student is shown.
    All,
    /// Students whose name contains any of the keywords as a whole word.
    NameMatches(Vec<String>),
}

impl StudentFilter {
    /// Builds a keyword filter; keywords are lowercased, blanks dropped.
    pub fn name_matches(keywords: Vec<String>) -> Self {
        let normalized: Vec<String> = keywords
            .into_iter()
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        Self::NameMatches(normalized)
    }

    /// Whether one student passes the filter.
    pub fn matches(&self, student: &Student) -> bool {
        match self {
            Self::All => true,
            Self::NameMatches(keywords) => student
                .name()
                .split_whitespace()
                .any(|word| keywords.iter().any(|keyword| word.eq_ignore_ascii_case(keyword))),
        }
    }

    /// Materializes the displayed sequence in roster order.
    pub fn displayed<'roster>(&self, roster: &'roster Roster) -> Vec<&'roster Student> {
        roster
            .students()
            .iter()
            .filter(|student| self.matches(student))
            .collect()
    }
}

impl Default for StudentFilter {
    fn default() -> Self {
        Self::All
    }
}
