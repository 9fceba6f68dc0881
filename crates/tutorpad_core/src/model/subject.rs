//! Subject record and its structural syllabus edit engine.
//!
//! # Responsibility
//! - Hold one subject enrollment: a normalized-name identity key plus an
//!   ordered syllabus topic sequence.
//! - Provide the pure structural operations every syllabus command
//!   delegates to.
//!
//! # Invariants
//! - Subject identity compares the whitespace-collapsed, case-folded name;
//!   the display form is preserved as entered.
//! - `with_topic_added` / `with_topics_added` / `with_topic_edited` never
//!   produce two topics with equal text.
//! - `with_topics_appended` is intentionally additive and performs no
//!   duplicate check.
//! - Topics are an explicitly ordered sequence; positions are 1-based and
//!   the only bound check is "index > length".

use crate::model::topic::SyllabusTopic;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Validation failures for subject construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectValidationError {
    /// Subject name is empty or whitespace-only.
    BlankName,
}

impl Display for SubjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "subject name must not be blank"),
        }
    }
}

impl Error for SubjectValidationError {}

/// Failures from the structural syllabus edit operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectEditError {
    /// A topic with this text already exists in the subject.
    DuplicateTopic(String),
    /// The same topic text appears more than once in one request.
    DuplicateTopicInput(String),
    /// A 1-based topic position beyond the current syllabus length.
    TopicIndexOutOfRange { index: usize, len: usize },
}

impl Display for SubjectEditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateTopic(text) => {
                write!(f, "syllabus already contains topic `{text}`")
            }
            Self::DuplicateTopicInput(text) => {
                write!(f, "topic `{text}` is repeated in the request")
            }
            Self::TopicIndexOutOfRange { index, len } => {
                write!(f, "syllabus position {index} is out of range (length {len})")
            }
        }
    }
}

impl Error for SubjectEditError {}

/// One subject enrollment with its ordered syllabus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    name: String,
    topics: Vec<SyllabusTopic>,
}

impl Subject {
    /// Creates a subject with an empty syllabus.
    ///
    /// # Errors
    /// - `BlankName` when `name` trims to nothing.
    pub fn new(name: impl Into<String>) -> Result<Self, SubjectValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SubjectValidationError::BlankName);
        }
        Ok(Self {
            name,
            topics: Vec::new(),
        })
    }

    /// Creates a subject with a pre-built topic sequence.
    ///
    /// Used by load paths where topic order and completion state already
    /// exist; performs the same name validation as [`Subject::new`].
    pub fn with_topics(
        name: impl Into<String>,
        topics: Vec<SyllabusTopic>,
    ) -> Result<Self, SubjectValidationError> {
        let mut subject = Self::new(name)?;
        subject.topics = topics;
        Ok(subject)
    }

    /// Display name as entered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized identity key: trimmed, inner whitespace collapsed,
    /// case-folded.
    pub fn identity_name(&self) -> String {
        normalize_subject_name(&self.name)
    }

    /// Identity comparison for duplicate detection and merge decisions.
    pub fn is_same_subject(&self, other: &Subject) -> bool {
        self.identity_name() == other.identity_name()
    }

    /// Ordered syllabus topics.
    pub fn topics(&self) -> &[SyllabusTopic] {
        &self.topics
    }

    /// Text-equality membership test used by callers to decide
    /// merge-vs-reject.
    pub fn contains_topic(&self, topic: &SyllabusTopic) -> bool {
        self.topics.iter().any(|existing| existing.same_text(topic))
    }

    /// Appends one topic at the end.
    ///
    /// # Errors
    /// - `DuplicateTopic` when the text is already present.
    pub fn with_topic_added(&self, topic: SyllabusTopic) -> Result<Self, SubjectEditError> {
        if self.contains_topic(&topic) {
            return Err(SubjectEditError::DuplicateTopic(topic.text().to_string()));
        }
        let mut next = self.clone();
        next.topics.push(topic);
        Ok(next)
    }

    /// Appends a batch of topics, all-or-nothing.
    ///
    /// The request itself is checked for internal duplicates before any
    /// collision check against the existing syllabus; no partial insert
    /// happens on failure.
    ///
    /// # Errors
    /// - `DuplicateTopicInput` when the batch repeats a text.
    /// - `DuplicateTopic` when a text is already present in the subject.
    pub fn with_topics_added(&self, topics: Vec<SyllabusTopic>) -> Result<Self, SubjectEditError> {
        for (position, topic) in topics.iter().enumerate() {
            if topics[..position].iter().any(|seen| seen.same_text(topic)) {
                return Err(SubjectEditError::DuplicateTopicInput(
                    topic.text().to_string(),
                ));
            }
        }
        for topic in &topics {
            if self.contains_topic(topic) {
                return Err(SubjectEditError::DuplicateTopic(topic.text().to_string()));
            }
        }

        let mut next = self.clone();
        next.topics.extend(topics);
        Ok(next)
    }

    /// Removes the topic at a 1-based position.
    ///
    /// The syllabus may become empty; only the owning student's subject
    /// collection must stay non-empty.
    ///
    /// # Errors
    /// - `TopicIndexOutOfRange` when `index` exceeds the syllabus length.
    pub fn with_topic_removed(&self, index: NonZeroUsize) -> Result<Self, SubjectEditError> {
        let slot = self.resolve(index)?;
        let mut next = self.clone();
        next.topics.remove(slot);
        Ok(next)
    }

    /// Replaces the topic at a 1-based position.
    ///
    /// Replacing a topic with itself (same position, same text) is allowed;
    /// only collisions with *other* topics are rejected.
    ///
    /// # Errors
    /// - `TopicIndexOutOfRange` when `index` exceeds the syllabus length.
    /// - `DuplicateTopic` when `new_topic` matches another topic's text.
    pub fn with_topic_edited(
        &self,
        index: NonZeroUsize,
        new_topic: SyllabusTopic,
    ) -> Result<Self, SubjectEditError> {
        let slot = self.resolve(index)?;
        let collides = self
            .topics
            .iter()
            .enumerate()
            .any(|(position, existing)| position != slot && existing.same_text(&new_topic));
        if collides {
            return Err(SubjectEditError::DuplicateTopic(
                new_topic.text().to_string(),
            ));
        }
        let mut next = self.clone();
        next.topics[slot] = new_topic;
        Ok(next)
    }

    /// Flips the completion flag of the topic at a 1-based position.
    ///
    /// # Errors
    /// - `TopicIndexOutOfRange` when `index` exceeds the syllabus length.
    pub fn with_topic_toggled(&self, index: NonZeroUsize) -> Result<Self, SubjectEditError> {
        let slot = self.resolve(index)?;
        let mut next = self.clone();
        next.topics[slot] = next.topics[slot].toggled();
        Ok(next)
    }

    /// Merges an external topic sequence onto the end.
    ///
    /// Used by cross-student subject copy. Intentionally additive: no
    /// duplicate check is performed and the operation never fails.
    pub fn with_topics_appended(&self, topics: Vec<SyllabusTopic>) -> Self {
        let mut next = self.clone();
        next.topics.extend(topics);
        next
    }

    fn resolve(&self, index: NonZeroUsize) -> Result<usize, SubjectEditError> {
        // Positivity is guaranteed by the type; length is the sole check.
        if index.get() > self.topics.len() {
            return Err(SubjectEditError::TopicIndexOutOfRange {
                index: index.get(),
                len: self.topics.len(),
            });
        }
        Ok(index.get() - 1)
    }
}

/// Normalizes a subject name into its identity form.
pub fn normalize_subject_name(name: &str) -> String {
    WHITESPACE_RE
        .replace_all(name.trim(), " ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{normalize_subject_name, Subject, SubjectValidationError};

    #[test]
    fn new_rejects_blank_name() {
        assert_eq!(
            Subject::new("  ").unwrap_err(),
            SubjectValidationError::BlankName
        );
    }

    #[test]
    fn identity_name_collapses_whitespace_and_case() {
        assert_eq!(normalize_subject_name("  Pure   Math "), "pure math");

        let left = Subject::new("Pure  Math").unwrap();
        let right = Subject::new("pure math").unwrap();
        assert!(left.is_same_subject(&right));
        assert_eq!(left.name(), "Pure  Math");
    }
}
