use rusqlite::Connection;
use tutorpad_core::db::migrations::latest_version;
use tutorpad_core::db::{open_db, open_db_in_memory};
use tutorpad_core::{
    Payment, Roster, RosterStore, SqliteRosterStore, StoreError, Student, StudentDetails, Subject,
    SyllabusTopic,
};

fn sample_roster() -> Roster {
    let mathematics = Subject::with_topics(
        "Mathematics",
        vec![
            SyllabusTopic::new("Integration").unwrap(),
            SyllabusTopic::new("Limits").unwrap().toggled(),
        ],
    )
    .unwrap();
    let physics = Subject::with_topics(
        "Physics",
        vec![SyllabusTopic::new("Kinematics").unwrap()],
    )
    .unwrap();

    let alice = Student::enroll(
        StudentDetails::new(
            "Alice Tan",
            "91234567",
            "alice@example.com",
            "1 Main Street",
            "Mon 4pm",
        )
        .unwrap(),
        vec!["sec4".into(), "olevel".into()],
        vec![mathematics, physics],
    )
    .unwrap()
    .with_payment_recorded(Payment {
        amount_cents: 12_000,
        recorded_at: 1_700_000_000_000,
    });

    let bob = Student::enroll(
        StudentDetails::new(
            "Bob Lee",
            "98765432",
            "bob@example.com",
            "2 Side Street",
            "Tue 6pm",
        )
        .unwrap(),
        vec![],
        vec![Subject::new("Chemistry").unwrap()],
    )
    .unwrap();

    Roster::from_students(vec![alice, bob]).unwrap()
}

#[test]
fn migration_creates_the_roster_tables() {
    let conn = open_db_in_memory().unwrap();

    for table in [
        "students",
        "student_tags",
        "payments",
        "subjects",
        "syllabus_topics",
    ] {
        let exists: i64 = conn
            .query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
                );",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(exists, 1, "missing table {table}");
    }

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn save_then_load_round_trips_the_roster() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();

    let roster = sample_roster();
    store.save_roster(&roster).unwrap();

    let loaded = store.load_roster().unwrap();
    assert_eq!(loaded, roster);

    // Spot-check the details that depend on ordering columns.
    let alice = &loaded.students()[0];
    assert_eq!(alice.subjects()[0].name(), "Mathematics");
    assert_eq!(alice.subjects()[1].name(), "Physics");
    assert!(alice.subjects()[0].topics()[1].is_done());
    assert_eq!(alice.payments()[0].amount_cents, 12_000);
    assert_eq!(alice.tags().collect::<Vec<_>>(), vec!["olevel", "sec4"]);
}

#[test]
fn save_replaces_the_previous_roster_wholesale() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();

    store.save_roster(&sample_roster()).unwrap();
    store.save_roster(&Roster::new()).unwrap();

    assert!(store.load_roster().unwrap().is_empty());
    let orphan_topics: i64 = conn
        .query_row("SELECT COUNT(*) FROM syllabus_topics;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphan_topics, 0);
}

#[test]
fn load_of_an_empty_database_yields_an_empty_roster() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();
    assert!(store.load_roster().unwrap().is_empty());
}

#[test]
fn store_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteRosterStore::try_new(&conn) {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn store_rejects_connection_missing_required_tables() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteRosterStore::try_new(&conn);
    assert!(matches!(
        result,
        Err(StoreError::MissingRequiredTable("students"))
    ));
}

#[test]
fn load_rejects_invalid_persisted_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO students (uuid, name, phone, email, address, tuition_timing, sort_order)
         VALUES ('not-a-uuid', 'Alice Tan', '91234567', 'a@b.com', 'addr', 'Mon', 0);",
        [],
    )
    .unwrap();

    let store = SqliteRosterStore::try_new(&conn).unwrap();
    let err = store.load_roster().unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn file_backed_roster_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tutorpad.db");

    {
        let conn = open_db(&db_path).unwrap();
        let store = SqliteRosterStore::try_new(&conn).unwrap();
        store.save_roster(&sample_roster()).unwrap();
    }

    let conn = open_db(&db_path).unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();
    let loaded = store.load_roster().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.students()[0].name(), "Alice Tan");
    assert_eq!(loaded.students()[0].subjects().len(), 2);
    assert_eq!(loaded.students()[1].details().tuition_timing(), "Tue 6pm");
}
