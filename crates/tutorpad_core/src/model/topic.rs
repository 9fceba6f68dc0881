//! Syllabus topic value.
//!
//! # Responsibility
//! - Define the smallest trackable syllabus unit: a text label plus a
//!   completion flag.
//!
//! # Invariants
//! - `text` is never blank.
//! - Duplicate detection compares `text` only; completion state is ignored.
//! - A topic is never mutated in place; edits produce replacement values.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failures for syllabus topic construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicValidationError {
    /// Topic text is empty or whitespace-only.
    BlankText,
}

impl Display for TopicValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankText => write!(f, "syllabus topic text must not be blank"),
        }
    }
}

impl Error for TopicValidationError {}

/// One trackable item inside a subject's syllabus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllabusTopic {
    text: String,
    done: bool,
}

impl SyllabusTopic {
    /// Creates a pending topic from non-blank text.
    ///
    /// # Errors
    /// - `BlankText` when `text` trims to nothing.
    pub fn new(text: impl Into<String>) -> Result<Self, TopicValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(TopicValidationError::BlankText);
        }
        Ok(Self { text, done: false })
    }

    /// Rebuilds a topic with an explicit completion state.
    ///
    /// Used by load paths where the flag already exists; performs the same
    /// text validation as [`SyllabusTopic::new`].
    pub fn with_state(
        text: impl Into<String>,
        done: bool,
    ) -> Result<Self, TopicValidationError> {
        let mut topic = Self::new(text)?;
        topic.done = done;
        Ok(topic)
    }

    /// Topic label as entered.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Completion flag.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Returns a replacement value with the completion flag flipped.
    /// Text is unchanged.
    pub fn toggled(&self) -> Self {
        Self {
            text: self.text.clone(),
            done: !self.done,
        }
    }

    /// Duplicate-detection equality: text only.
    pub fn same_text(&self, other: &SyllabusTopic) -> bool {
        self.text == other.text
    }
}
