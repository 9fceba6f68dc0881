//! Roster persistence contracts and SQLite implementation.
//!
//! # Responsibility
//! - Load the initial roster at session start.
//! - Persist the committed roster after every successful command.
//!
//! # Invariants
//! - `save_roster` replaces the whole persisted roster in one transaction.
//! - Load order is deterministic: `sort_order ASC` at every level.
//! - Read paths rebuild records through the validating factories and
//!   reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::roster::Roster;
use crate::model::student::{Payment, Student, StudentDetails, StudentId};
use crate::model::subject::Subject;
use crate::model::topic::SyllabusTopic;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from roster persistence operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be rebuilt into a valid roster.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "roster store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "roster store requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence interface for the committed roster.
pub trait RosterStore {
    /// Loads the persisted roster in deterministic order.
    fn load_roster(&self) -> StoreResult<Roster>;
    /// Replaces the persisted roster with `roster` atomically.
    fn save_roster(&self, roster: &Roster) -> StoreResult<()>;
}

/// SQLite-backed roster store.
pub struct SqliteRosterStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRosterStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RosterStore for SqliteRosterStore<'_> {
    fn load_roster(&self) -> StoreResult<Roster> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, phone, email, address, tuition_timing
             FROM students
             ORDER BY sort_order ASC;",
        )?;
        let mut rows = stmt.query([])?;

        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            let id = parse_uuid(&uuid_text)?;
            let details = StudentDetails::new(
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            )
            .map_err(|err| {
                StoreError::InvalidData(format!("student `{uuid_text}` fields: {err}"))
            })?;

            let tags = load_tags(self.conn, &uuid_text)?;
            let payments = load_payments(self.conn, &uuid_text)?;
            let subjects = load_subjects(self.conn, &uuid_text)?;

            let student =
                Student::with_id(id, details, tags, subjects, payments).map_err(|err| {
                    StoreError::InvalidData(format!("student `{uuid_text}` subjects: {err}"))
                })?;
            students.push(student);
        }

        Roster::from_students(students)
            .map_err(|err| StoreError::InvalidData(format!("roster uniqueness: {err}")))
    }

    fn save_roster(&self, roster: &Roster) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        // Cascades clear tags, payments, subjects and topics.
        tx.execute("DELETE FROM students;", [])?;

        for (position, student) in roster.students().iter().enumerate() {
            insert_student(&tx, student, position as i64)?;
        }

        tx.commit()?;
        Ok(())
    }
}

fn insert_student(tx: &Transaction<'_>, student: &Student, sort_order: i64) -> StoreResult<()> {
    let student_uuid = student.id().to_string();
    let details = student.details();
    tx.execute(
        "INSERT INTO students (uuid, name, phone, email, address, tuition_timing, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            student_uuid,
            details.name(),
            details.phone(),
            details.email(),
            details.address(),
            details.tuition_timing(),
            sort_order,
        ],
    )?;

    for tag in student.tags() {
        tx.execute(
            "INSERT INTO student_tags (student_uuid, tag) VALUES (?1, ?2);",
            params![student_uuid, tag],
        )?;
    }

    for (position, payment) in student.payments().iter().enumerate() {
        tx.execute(
            "INSERT INTO payments (student_uuid, amount_cents, recorded_at, sort_order)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                student_uuid,
                payment.amount_cents,
                payment.recorded_at,
                position as i64
            ],
        )?;
    }

    for (position, subject) in student.subjects().iter().enumerate() {
        tx.execute(
            "INSERT INTO subjects (student_uuid, name, sort_order) VALUES (?1, ?2, ?3);",
            params![student_uuid, subject.name(), position as i64],
        )?;
        let subject_id = tx.last_insert_rowid();

        for (topic_position, topic) in subject.topics().iter().enumerate() {
            tx.execute(
                "INSERT INTO syllabus_topics (subject_id, text, done, sort_order)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    subject_id,
                    topic.text(),
                    topic.is_done() as i64,
                    topic_position as i64
                ],
            )?;
        }
    }

    Ok(())
}

fn load_tags(conn: &Connection, student_uuid: &str) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT tag FROM student_tags WHERE student_uuid = ?1 ORDER BY tag ASC;",
    )?;
    let mut rows = stmt.query([student_uuid])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}

fn load_payments(conn: &Connection, student_uuid: &str) -> StoreResult<Vec<Payment>> {
    let mut stmt = conn.prepare(
        "SELECT amount_cents, recorded_at
         FROM payments
         WHERE student_uuid = ?1
         ORDER BY sort_order ASC;",
    )?;
    let mut rows = stmt.query([student_uuid])?;
    let mut payments = Vec::new();
    while let Some(row) = rows.next()? {
        payments.push(Payment {
            amount_cents: row.get(0)?,
            recorded_at: row.get(1)?,
        });
    }
    Ok(payments)
}

fn load_subjects(conn: &Connection, student_uuid: &str) -> StoreResult<Vec<Subject>> {
    let mut stmt = conn.prepare(
        "SELECT id, name
         FROM subjects
         WHERE student_uuid = ?1
         ORDER BY sort_order ASC;",
    )?;
    let mut rows = stmt.query([student_uuid])?;

    let mut subjects = Vec::new();
    while let Some(row) = rows.next()? {
        let subject_id: i64 = row.get(0)?;
        let name: String = row.get(1)?;
        let topics = load_topics(conn, subject_id)?;
        let subject = Subject::with_topics(name, topics).map_err(|err| {
            StoreError::InvalidData(format!("subject {subject_id}: {err}"))
        })?;
        subjects.push(subject);
    }
    Ok(subjects)
}

fn load_topics(conn: &Connection, subject_id: i64) -> StoreResult<Vec<SyllabusTopic>> {
    let mut stmt = conn.prepare(
        "SELECT text, done
         FROM syllabus_topics
         WHERE subject_id = ?1
         ORDER BY sort_order ASC;",
    )?;
    let mut rows = stmt.query([subject_id])?;

    let mut topics = Vec::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        let done = match row.get::<_, i64>(1)? {
            0 => false,
            1 => true,
            other => {
                return Err(StoreError::InvalidData(format!(
                    "invalid done value `{other}` in syllabus_topics.done"
                )));
            }
        };
        let topic = SyllabusTopic::with_state(text, done).map_err(|err| {
            StoreError::InvalidData(format!("subject {subject_id} topic: {err}"))
        })?;
        topics.push(topic);
    }
    Ok(topics)
}

fn parse_uuid(value: &str) -> StoreResult<StudentId> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{value}` in students.uuid")))
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in [
        "students",
        "student_tags",
        "payments",
        "subjects",
        "syllabus_topics",
    ] {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
