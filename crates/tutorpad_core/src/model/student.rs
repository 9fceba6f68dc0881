//! Student record and subject-collection composition.
//!
//! # Responsibility
//! - Define the canonical student record: identity fields, tags, payments
//!   and the ordered subject collection.
//! - Validate plain fields at construction so no invalid record ever
//!   reaches the roster.
//!
//! # Invariants
//! - `id` is stable and preserved by every identity-preserving replacement.
//! - The subject collection is never empty.
//! - No two subjects share an identity name.
//! - Subjects are an explicitly ordered sequence so positional addressing
//!   stays well-defined across edits.

use crate::model::subject::Subject;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9 .,'/-]*$").expect("valid name regex"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3,}$").expect("valid phone regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+$").expect("valid email regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier for a student record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type StudentId = Uuid;

/// Plain-field validation failures for student details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    /// Name is blank or contains characters outside the name pattern.
    InvalidName(String),
    /// Phone is not a run of at least three digits.
    InvalidPhone(String),
    /// Email does not match the `local@domain` shape.
    InvalidEmail(String),
    /// Address is empty or whitespace-only.
    BlankAddress,
    /// Tuition timing is empty or whitespace-only.
    BlankTuitionTiming,
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "invalid student name: `{value}`"),
            Self::InvalidPhone(value) => write!(f, "invalid phone number: `{value}`"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::BlankAddress => write!(f, "address must not be blank"),
            Self::BlankTuitionTiming => write!(f, "tuition timing must not be blank"),
        }
    }
}

impl Error for StudentValidationError {}

/// Failures from subject-collection composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentEditError {
    /// Replacement subject collection is empty.
    EmptySubjectSet,
    /// Two subjects in the collection share an identity name.
    DuplicateSubject(String),
    /// A subject slot beyond the current collection length.
    SubjectIndexOutOfRange { index: usize, len: usize },
}

impl Display for StudentEditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySubjectSet => {
                write!(f, "a student must keep at least one subject")
            }
            Self::DuplicateSubject(name) => {
                write!(f, "student already has subject `{name}`")
            }
            Self::SubjectIndexOutOfRange { index, len } => {
                write!(f, "subject position {index} is out of range (length {len})")
            }
        }
    }
}

impl Error for StudentEditError {}

/// Validated plain identity and contact fields.
///
/// Built once by the validating factory; every holder of a value of this
/// type may assume the fields already passed the patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDetails {
    name: String,
    phone: String,
    email: String,
    address: String,
    tuition_timing: String,
}

impl StudentDetails {
    /// Validates and normalizes the plain fields.
    ///
    /// Fields are trimmed; inner spacing is preserved as entered.
    ///
    /// # Errors
    /// - One `StudentValidationError` variant per failing field, first
    ///   failure wins in declaration order.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
        tuition_timing: impl Into<String>,
    ) -> Result<Self, StudentValidationError> {
        let name = name.into().trim().to_string();
        if !NAME_RE.is_match(&name) {
            return Err(StudentValidationError::InvalidName(name));
        }
        let phone = phone.into().trim().to_string();
        if !PHONE_RE.is_match(&phone) {
            return Err(StudentValidationError::InvalidPhone(phone));
        }
        let email = email.into().trim().to_string();
        if !EMAIL_RE.is_match(&email) {
            return Err(StudentValidationError::InvalidEmail(email));
        }
        let address = address.into().trim().to_string();
        if address.is_empty() {
            return Err(StudentValidationError::BlankAddress);
        }
        let tuition_timing = tuition_timing.into().trim().to_string();
        if tuition_timing.is_empty() {
            return Err(StudentValidationError::BlankTuitionTiming);
        }
        Ok(Self {
            name,
            phone,
            email,
            address,
            tuition_timing,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn tuition_timing(&self) -> &str {
        &self.tuition_timing
    }
}

/// One recorded tuition payment. Append-only; no arithmetic in core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Paid amount in cents.
    pub amount_cents: i64,
    /// Recording timestamp in epoch milliseconds, supplied by the caller.
    pub recorded_at: i64,
}

/// Canonical student record.
///
/// Replaced wholesale on every change; the stable `id` survives all
/// identity-preserving replacements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    id: StudentId,
    details: StudentDetails,
    tags: BTreeSet<String>,
    payments: Vec<Payment>,
    subjects: Vec<Subject>,
}

impl Student {
    /// Enrolls a new student with a generated stable id.
    ///
    /// Tags are normalized (trimmed, lowercased, deduplicated; blanks
    /// dropped).
    ///
    /// # Errors
    /// - `EmptySubjectSet` when `subjects` is empty.
    /// - `DuplicateSubject` when two subjects share an identity name.
    pub fn enroll(
        details: StudentDetails,
        tags: Vec<String>,
        subjects: Vec<Subject>,
    ) -> Result<Self, StudentEditError> {
        Self::with_id(Uuid::new_v4(), details, tags, subjects, Vec::new())
    }

    /// Rebuilds a student with a caller-provided stable id.
    ///
    /// Used by load paths where identity already exists; enforces the same
    /// subject-collection invariants as [`Student::enroll`].
    pub fn with_id(
        id: StudentId,
        details: StudentDetails,
        tags: Vec<String>,
        subjects: Vec<Subject>,
        payments: Vec<Payment>,
    ) -> Result<Self, StudentEditError> {
        ensure_subject_set(&subjects)?;
        Ok(Self {
            id,
            details,
            tags: normalize_tags(&tags),
            payments,
            subjects,
        })
    }

    pub fn id(&self) -> StudentId {
        self.id
    }

    pub fn details(&self) -> &StudentDetails {
        &self.details
    }

    pub fn name(&self) -> &str {
        self.details.name()
    }

    /// Normalized tag set in deterministic order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    /// Ordered subject collection.
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Roster-level identity: normalized name plus phone.
    ///
    /// Distinct from full-value equality, which history comparisons use.
    pub fn is_same_student(&self, other: &Student) -> bool {
        normalize_identity_text(self.details.name()) == normalize_identity_text(other.details.name())
            && self.details.phone() == other.details.phone()
    }

    /// New record (same id) with the plain fields replaced.
    pub fn with_details(&self, details: StudentDetails) -> Self {
        let mut next = self.clone();
        next.details = details;
        next
    }

    /// New record (same id) with the tag set replaced and re-normalized.
    pub fn with_tags(&self, tags: Vec<String>) -> Self {
        let mut next = self.clone();
        next.tags = normalize_tags(&tags);
        next
    }

    /// New record (same id) with one payment appended.
    pub fn with_payment_recorded(&self, payment: Payment) -> Self {
        let mut next = self.clone();
        next.payments.push(payment);
        next
    }

    /// New record (same id) with the subject collection replaced.
    ///
    /// # Errors
    /// - `EmptySubjectSet` when `subjects` is empty.
    /// - `DuplicateSubject` when two subjects share an identity name.
    pub fn with_subjects(&self, subjects: Vec<Subject>) -> Result<Self, StudentEditError> {
        ensure_subject_set(&subjects)?;
        let mut next = self.clone();
        next.subjects = subjects;
        Ok(next)
    }

    /// New record (same id) with the subject at a 0-based slot replaced.
    ///
    /// # Errors
    /// - `SubjectIndexOutOfRange` when `slot` is beyond the collection.
    /// - `DuplicateSubject` when the replacement's identity name collides
    ///   with a subject in a different slot.
    pub fn with_subject_replaced(
        &self,
        slot: usize,
        subject: Subject,
    ) -> Result<Self, StudentEditError> {
        if slot >= self.subjects.len() {
            return Err(StudentEditError::SubjectIndexOutOfRange {
                index: slot + 1,
                len: self.subjects.len(),
            });
        }
        let collides = self
            .subjects
            .iter()
            .enumerate()
            .any(|(position, existing)| position != slot && existing.is_same_subject(&subject));
        if collides {
            return Err(StudentEditError::DuplicateSubject(
                subject.name().to_string(),
            ));
        }
        let mut next = self.clone();
        next.subjects[slot] = subject;
        Ok(next)
    }

    /// Finds a subject by identity name.
    ///
    /// Returns the 0-based slot in the stable ordered sequence together
    /// with the subject; used to decide merge-vs-insert on copy.
    pub fn find_subject(&self, name: &str) -> Option<(usize, &Subject)> {
        let wanted = normalize_identity_text(name);
        self.subjects
            .iter()
            .enumerate()
            .find(|(_, subject)| subject.identity_name() == wanted)
    }
}

fn ensure_subject_set(subjects: &[Subject]) -> Result<(), StudentEditError> {
    if subjects.is_empty() {
        return Err(StudentEditError::EmptySubjectSet);
    }
    for (position, subject) in subjects.iter().enumerate() {
        if subjects[..position]
            .iter()
            .any(|seen| seen.is_same_subject(subject))
        {
            return Err(StudentEditError::DuplicateSubject(
                subject.name().to_string(),
            ));
        }
    }
    Ok(())
}

/// Normalizes free text for identity comparison: trimmed, inner whitespace
/// collapsed, case-folded.
pub fn normalize_identity_text(value: &str) -> String {
    WHITESPACE_RE
        .replace_all(value.trim(), " ")
        .to_lowercase()
}

/// Normalizes and deduplicates tag values; blanks are dropped.
pub fn normalize_tags(tags: &[String]) -> BTreeSet<String> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        let trimmed = tag.trim();
        if !trimmed.is_empty() {
            unique.insert(trimmed.to_lowercase());
        }
    }
    unique
}
