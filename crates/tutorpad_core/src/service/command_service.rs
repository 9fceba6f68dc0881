//! Command layer over the versioned roster.
//!
//! # Responsibility
//! - Resolve displayed-view positions into live records.
//! - Delegate to the pure Subject/Student edit operations.
//! - Commit a roster snapshot to history after every successful edit and
//!   hand the committed roster to the store.
//!
//! # Invariants
//! - Every structural command follows the same protocol: resolve student,
//!   resolve subject, resolve topic, delegate, then swap/commit/save.
//! - A command that fails at any step leaves roster, history, filter and
//!   store untouched.
//! - Undo/redo bypass the edit engine and act purely on history.

use crate::history::{HistoryError, RosterHistory};
use crate::model::roster::{Roster, RosterError};
use crate::model::student::{
    Payment, Student, StudentDetails, StudentEditError, StudentValidationError,
};
use crate::model::subject::{Subject, SubjectEditError, SubjectValidationError};
use crate::model::topic::{SyllabusTopic, TopicValidationError};
use crate::repo::roster_store::{RosterStore, StoreError};
use crate::view::StudentFilter;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;

/// Failures surfaced by command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Student position beyond the currently displayed sequence.
    InvalidStudentIndex { index: usize, shown: usize },
    /// Subject position beyond the student's subject collection.
    InvalidSubjectIndex { index: usize, available: usize },
    /// Syllabus position beyond the subject's topic sequence.
    InvalidSyllabusIndex { index: usize, available: usize },
    /// Blank topic text in a request.
    Topic(TopicValidationError),
    /// Blank subject name in a request.
    SubjectName(SubjectValidationError),
    /// Duplicate topic collisions from the syllabus edit engine.
    Syllabus(SubjectEditError),
    /// Subject-collection invariant violations.
    Student(StudentEditError),
    /// Plain-field validation failures.
    Validation(StudentValidationError),
    /// Roster-level uniqueness or consistency failures.
    Roster(RosterError),
    /// History-boundary failures from undo/redo.
    History(HistoryError),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStudentIndex { index, shown } => {
                write!(f, "student position {index} is out of range ({shown} shown)")
            }
            Self::InvalidSubjectIndex { index, available } => {
                write!(
                    f,
                    "subject position {index} is out of range ({available} available)"
                )
            }
            Self::InvalidSyllabusIndex { index, available } => {
                write!(
                    f,
                    "syllabus position {index} is out of range ({available} available)"
                )
            }
            Self::Topic(err) => write!(f, "{err}"),
            Self::SubjectName(err) => write!(f, "{err}"),
            Self::Syllabus(err) => write!(f, "{err}"),
            Self::Student(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Roster(err) => write!(f, "{err}"),
            Self::History(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Topic(err) => Some(err),
            Self::SubjectName(err) => Some(err),
            Self::Syllabus(err) => Some(err),
            Self::Student(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Roster(err) => Some(err),
            Self::History(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TopicValidationError> for CommandError {
    fn from(value: TopicValidationError) -> Self {
        Self::Topic(value)
    }
}

impl From<SubjectValidationError> for CommandError {
    fn from(value: SubjectValidationError) -> Self {
        Self::SubjectName(value)
    }
}

impl From<SubjectEditError> for CommandError {
    fn from(value: SubjectEditError) -> Self {
        match value {
            SubjectEditError::TopicIndexOutOfRange { index, len } => Self::InvalidSyllabusIndex {
                index,
                available: len,
            },
            other => Self::Syllabus(other),
        }
    }
}

impl From<StudentEditError> for CommandError {
    fn from(value: StudentEditError) -> Self {
        Self::Student(value)
    }
}

impl From<StudentValidationError> for CommandError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RosterError> for CommandError {
    fn from(value: RosterError) -> Self {
        Self::Roster(value)
    }
}

impl From<HistoryError> for CommandError {
    fn from(value: HistoryError) -> Self {
        Self::History(value)
    }
}

/// Request payload for enrolling a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub tuition_timing: String,
    pub tags: Vec<String>,
    /// Subject names; a student enrolls with at least one.
    pub subjects: Vec<String>,
}

/// Partial field replacement for an existing student.
///
/// `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFieldEdits {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub tuition_timing: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Closed set of structural edit intents.
///
/// All positions are 1-based and positive by construction; resolution
/// happens against the currently displayed student sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    AddStudent(NewStudent),
    EditStudent {
        student: NonZeroUsize,
        edits: StudentFieldEdits,
    },
    DeleteStudent {
        student: NonZeroUsize,
    },
    RecordPayment {
        student: NonZeroUsize,
        amount_cents: i64,
        /// Epoch milliseconds, supplied by the caller.
        recorded_at: i64,
    },
    AddSubject {
        student: NonZeroUsize,
        name: String,
    },
    DeleteSubject {
        student: NonZeroUsize,
        subject: NonZeroUsize,
    },
    /// Copies one subject from one student into another: merge-append when
    /// the target already has the subject, insert otherwise.
    CopySubject {
        from_student: NonZeroUsize,
        subject: NonZeroUsize,
        to_student: NonZeroUsize,
    },
    AddSyllabus {
        student: NonZeroUsize,
        subject: NonZeroUsize,
        topics: Vec<String>,
    },
    DeleteSyllabus {
        student: NonZeroUsize,
        subject: NonZeroUsize,
        topic: NonZeroUsize,
    },
    EditSyllabus {
        student: NonZeroUsize,
        subject: NonZeroUsize,
        topic: NonZeroUsize,
        new_text: String,
    },
    ToggleSyllabus {
        student: NonZeroUsize,
        subject: NonZeroUsize,
        topic: NonZeroUsize,
    },
}

impl EditCommand {
    fn label(&self) -> &'static str {
        match self {
            Self::AddStudent(_) => "add_student",
            Self::EditStudent { .. } => "edit_student",
            Self::DeleteStudent { .. } => "delete_student",
            Self::RecordPayment { .. } => "record_payment",
            Self::AddSubject { .. } => "add_subject",
            Self::DeleteSubject { .. } => "delete_subject",
            Self::CopySubject { .. } => "copy_subject",
            Self::AddSyllabus { .. } => "add_syllabus",
            Self::DeleteSyllabus { .. } => "delete_syllabus",
            Self::EditSyllabus { .. } => "edit_syllabus",
            Self::ToggleSyllabus { .. } => "toggle_syllabus",
        }
    }
}

/// One human-readable result per command, for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub summary: String,
}

impl CommandOutcome {
    fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
        }
    }
}

/// Session facade owning the roster, its history and the active filter.
///
/// One command runs to completion before the next begins; all mutation is
/// routed through [`CommandService::execute`] or the undo/redo/clear entry
/// points.
pub struct CommandService<S: RosterStore> {
    store: S,
    roster: Roster,
    history: RosterHistory,
    filter: StudentFilter,
}

impl<S: RosterStore> CommandService<S> {
    /// Starts a session from the store's persisted roster.
    pub fn new(store: S) -> Result<Self, StoreError> {
        let roster = store.load_roster()?;
        Ok(Self::with_roster(store, roster))
    }

    /// Starts a session from an explicit initial roster.
    pub fn with_roster(store: S, roster: Roster) -> Self {
        let history = RosterHistory::new(roster.clone());
        Self {
            store,
            roster,
            history,
            filter: StudentFilter::All,
        }
    }

    /// Current committed roster.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Active display filter.
    pub fn filter(&self) -> &StudentFilter {
        &self.filter
    }

    /// The student sequence the next command's positions resolve against.
    pub fn displayed_students(&self) -> Vec<&Student> {
        self.filter.displayed(&self.roster)
    }

    /// Executes one structural edit command.
    ///
    /// On success the edited roster is swapped in, the displayed view is
    /// reset to show-all, a snapshot is committed to history and the
    /// committed roster is handed to the store. On failure nothing is
    /// mutated and nothing is committed.
    pub fn execute(&mut self, command: EditCommand) -> Result<CommandOutcome, CommandError> {
        let label = command.label();
        match self.apply(command) {
            Ok((next, summary)) => {
                self.roster = next;
                self.filter = StudentFilter::All;
                self.history.commit(&self.roster);
                self.persist_committed(label);
                info!("event=command_execute module=service status=ok command={label}");
                Ok(CommandOutcome::new(summary))
            }
            Err(err) => {
                warn!("event=command_execute module=service status=error command={label} error={err}");
                Err(err)
            }
        }
    }

    /// Restores the previous roster snapshot. Preserves the active filter.
    pub fn undo(&mut self) -> Result<CommandOutcome, CommandError> {
        let snapshot = self.history.undo().map_err(|err| {
            warn!("event=command_execute module=service status=error command=undo error={err}");
            CommandError::from(err)
        })?;
        let snapshot = snapshot.clone();
        self.roster.reset_to(snapshot);
        self.persist_committed("undo");
        info!("event=command_execute module=service status=ok command=undo");
        Ok(CommandOutcome::new("Restored the previous roster state"))
    }

    /// Re-applies the next roster snapshot. Preserves the active filter.
    pub fn redo(&mut self) -> Result<CommandOutcome, CommandError> {
        let snapshot = self.history.redo().map_err(|err| {
            warn!("event=command_execute module=service status=error command=redo error={err}");
            CommandError::from(err)
        })?;
        let snapshot = snapshot.clone();
        self.roster.reset_to(snapshot);
        self.persist_committed("redo");
        info!("event=command_execute module=service status=ok command=redo");
        Ok(CommandOutcome::new("Restored the next roster state"))
    }

    /// Empties the roster. Commits a snapshot like any other edit.
    pub fn clear(&mut self) -> CommandOutcome {
        self.roster.reset_to(Roster::new());
        self.filter = StudentFilter::All;
        self.history.commit(&self.roster);
        self.persist_committed("clear");
        info!("event=command_execute module=service status=ok command=clear");
        CommandOutcome::new("Cleared the roster")
    }

    /// Narrows the displayed sequence to name-keyword matches.
    pub fn find(&mut self, keywords: Vec<String>) -> CommandOutcome {
        self.filter = StudentFilter::name_matches(keywords);
        let shown = self.displayed_students().len();
        info!("event=command_execute module=service status=ok command=find shown={shown}");
        CommandOutcome::new(format!("{shown} students listed"))
    }

    /// Shows every student again.
    pub fn list_all(&mut self) -> CommandOutcome {
        self.filter = StudentFilter::All;
        let shown = self.roster.len();
        info!("event=command_execute module=service status=ok command=list shown={shown}");
        CommandOutcome::new(format!("{shown} students listed"))
    }

    /// Validation and pure-edit phase: computes the replacement roster and
    /// the success summary without touching session state.
    fn apply(&self, command: EditCommand) -> Result<(Roster, String), CommandError> {
        match command {
            EditCommand::AddStudent(request) => self.apply_add_student(request),
            EditCommand::EditStudent { student, edits } => self.apply_edit_student(student, edits),
            EditCommand::DeleteStudent { student } => self.apply_delete_student(student),
            EditCommand::RecordPayment {
                student,
                amount_cents,
                recorded_at,
            } => self.apply_record_payment(student, amount_cents, recorded_at),
            EditCommand::AddSubject { student, name } => self.apply_add_subject(student, name),
            EditCommand::DeleteSubject { student, subject } => {
                self.apply_delete_subject(student, subject)
            }
            EditCommand::CopySubject {
                from_student,
                subject,
                to_student,
            } => self.apply_copy_subject(from_student, subject, to_student),
            EditCommand::AddSyllabus {
                student,
                subject,
                topics,
            } => self.apply_syllabus_edit(student, subject, "Added", |target| {
                let topics = topics
                    .iter()
                    .map(|text| SyllabusTopic::new(text.as_str()))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(target.with_topics_added(topics)?)
            }),
            EditCommand::DeleteSyllabus {
                student,
                subject,
                topic,
            } => self.apply_syllabus_edit(student, subject, "Removed", |target| {
                Ok(target.with_topic_removed(topic)?)
            }),
            EditCommand::EditSyllabus {
                student,
                subject,
                topic,
                new_text,
            } => self.apply_syllabus_edit(student, subject, "Edited", |target| {
                let replacement = SyllabusTopic::new(new_text.as_str())?;
                Ok(target.with_topic_edited(topic, replacement)?)
            }),
            EditCommand::ToggleSyllabus {
                student,
                subject,
                topic,
            } => self.apply_syllabus_edit(student, subject, "Toggled", |target| {
                Ok(target.with_topic_toggled(topic)?)
            }),
        }
    }

    fn apply_add_student(&self, request: NewStudent) -> Result<(Roster, String), CommandError> {
        let details = StudentDetails::new(
            request.name,
            request.phone,
            request.email,
            request.address,
            request.tuition_timing,
        )?;
        let subjects = request
            .subjects
            .into_iter()
            .map(Subject::new)
            .collect::<Result<Vec<_>, _>>()?;
        let student = Student::enroll(details, request.tags, subjects)?;

        let summary = format!("Added student: {}", student.name());
        let mut next = self.roster.clone();
        next.add_student(student)?;
        Ok((next, summary))
    }

    fn apply_edit_student(
        &self,
        student: NonZeroUsize,
        edits: StudentFieldEdits,
    ) -> Result<(Roster, String), CommandError> {
        let old = self.resolve_student(student)?;
        let current = old.details();
        let details = StudentDetails::new(
            edits.name.unwrap_or_else(|| current.name().to_string()),
            edits.phone.unwrap_or_else(|| current.phone().to_string()),
            edits.email.unwrap_or_else(|| current.email().to_string()),
            edits
                .address
                .unwrap_or_else(|| current.address().to_string()),
            edits
                .tuition_timing
                .unwrap_or_else(|| current.tuition_timing().to_string()),
        )?;

        let mut updated = old.with_details(details);
        if let Some(tags) = edits.tags {
            updated = updated.with_tags(tags);
        }

        let summary = format!("Updated student: {}", updated.name());
        let mut next = self.roster.clone();
        next.replace_student(&old, updated)?;
        Ok((next, summary))
    }

    fn apply_delete_student(&self, student: NonZeroUsize) -> Result<(Roster, String), CommandError> {
        let old = self.resolve_student(student)?;
        let summary = format!("Deleted student: {}", old.name());
        let mut next = self.roster.clone();
        next.delete_student(&old)?;
        Ok((next, summary))
    }

    fn apply_record_payment(
        &self,
        student: NonZeroUsize,
        amount_cents: i64,
        recorded_at: i64,
    ) -> Result<(Roster, String), CommandError> {
        let old = self.resolve_student(student)?;
        let updated = old.with_payment_recorded(Payment {
            amount_cents,
            recorded_at,
        });

        let summary = format!("Recorded payment for {}", updated.name());
        let mut next = self.roster.clone();
        next.replace_student(&old, updated)?;
        Ok((next, summary))
    }

    fn apply_add_subject(
        &self,
        student: NonZeroUsize,
        name: String,
    ) -> Result<(Roster, String), CommandError> {
        let old = self.resolve_student(student)?;
        let subject = Subject::new(name)?;
        let summary = format!("Added subject {} for {}", subject.name(), old.name());

        let mut subjects = old.subjects().to_vec();
        subjects.push(subject);
        let updated = old.with_subjects(subjects)?;

        let mut next = self.roster.clone();
        next.replace_student(&old, updated)?;
        Ok((next, summary))
    }

    fn apply_delete_subject(
        &self,
        student: NonZeroUsize,
        subject: NonZeroUsize,
    ) -> Result<(Roster, String), CommandError> {
        let old = self.resolve_student(student)?;
        let (slot, target) = resolve_subject(&old, subject)?;
        let summary = format!("Removed subject {} from {}", target.name(), old.name());

        let mut subjects = old.subjects().to_vec();
        subjects.remove(slot);
        let updated = old.with_subjects(subjects)?;

        let mut next = self.roster.clone();
        next.replace_student(&old, updated)?;
        Ok((next, summary))
    }

    fn apply_copy_subject(
        &self,
        from_student: NonZeroUsize,
        subject: NonZeroUsize,
        to_student: NonZeroUsize,
    ) -> Result<(Roster, String), CommandError> {
        let source_owner = self.resolve_student(from_student)?;
        let (_, source) = resolve_subject(&source_owner, subject)?;
        let target = self.resolve_student(to_student)?;

        // Merge when the target already enrolls the subject, insert
        // otherwise. The merge is additive: no duplicate-topic check.
        let updated = match target.find_subject(source.name()) {
            Some((slot, existing)) => {
                let merged = existing.with_topics_appended(source.topics().to_vec());
                target.with_subject_replaced(slot, merged)?
            }
            None => {
                let mut subjects = target.subjects().to_vec();
                subjects.push(source.clone());
                target.with_subjects(subjects)?
            }
        };

        let summary = format!("Copied subject {} to {}", source.name(), updated.name());
        let mut next = self.roster.clone();
        next.replace_student(&target, updated)?;
        Ok((next, summary))
    }

    fn apply_syllabus_edit(
        &self,
        student: NonZeroUsize,
        subject: NonZeroUsize,
        verb: &str,
        edit: impl FnOnce(&Subject) -> Result<Subject, CommandError>,
    ) -> Result<(Roster, String), CommandError> {
        let old = self.resolve_student(student)?;
        let (slot, target) = resolve_subject(&old, subject)?;

        let edited = edit(&target)?;
        let updated = old.with_subject_replaced(slot, edited)?;

        let summary = format!(
            "{verb} syllabus topic for {} of {}",
            target.name(),
            old.name()
        );
        let mut next = self.roster.clone();
        next.replace_student(&old, updated)?;
        Ok((next, summary))
    }

    fn resolve_student(&self, index: NonZeroUsize) -> Result<Student, CommandError> {
        let shown = self.filter.displayed(&self.roster);
        if index.get() > shown.len() {
            return Err(CommandError::InvalidStudentIndex {
                index: index.get(),
                shown: shown.len(),
            });
        }
        Ok(shown[index.get() - 1].clone())
    }

    fn persist_committed(&self, command: &str) {
        // The in-memory core stays authoritative; a failed save is logged
        // and does not fail the already-committed command.
        if let Err(err) = self.store.save_roster(&self.roster) {
            error!("event=roster_save module=service status=error command={command} error={err}");
        }
    }
}

fn resolve_subject(
    student: &Student,
    index: NonZeroUsize,
) -> Result<(usize, Subject), CommandError> {
    let subjects = student.subjects();
    if index.get() > subjects.len() {
        return Err(CommandError::InvalidSubjectIndex {
            index: index.get(),
            available: subjects.len(),
        });
    }
    let slot = index.get() - 1;
    Ok((slot, subjects[slot].clone()))
}
