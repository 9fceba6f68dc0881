use tutorpad_core::{
    Payment, Student, StudentDetails, StudentEditError, Subject, SyllabusTopic,
};

fn details(name: &str, phone: &str) -> StudentDetails {
    StudentDetails::new(name, phone, "student@example.com", "1 Main Street", "Mon 4pm").unwrap()
}

fn subject(name: &str) -> Subject {
    Subject::new(name).unwrap()
}

#[test]
fn enroll_requires_at_least_one_subject() {
    let err = Student::enroll(details("Alice Tan", "91234567"), vec![], vec![]).unwrap_err();
    assert_eq!(err, StudentEditError::EmptySubjectSet);
}

#[test]
fn enroll_rejects_subjects_sharing_an_identity_name() {
    let err = Student::enroll(
        details("Alice Tan", "91234567"),
        vec![],
        vec![subject("Mathematics"), subject("  mathematics ")],
    )
    .unwrap_err();
    assert_eq!(
        err,
        StudentEditError::DuplicateSubject("  mathematics ".into())
    );
}

#[test]
fn enroll_normalizes_tags() {
    let student = Student::enroll(
        details("Alice Tan", "91234567"),
        vec!["Sec4".into(), "SEC4".into(), " ".into(), "olevel".into()],
        vec![subject("Mathematics")],
    )
    .unwrap();

    let tags: Vec<&str> = student.tags().collect();
    assert_eq!(tags, vec!["olevel", "sec4"]);
}

#[test]
fn with_subjects_keeps_id_and_rejects_empty_replacement() {
    let student = Student::enroll(
        details("Alice Tan", "91234567"),
        vec![],
        vec![subject("Mathematics")],
    )
    .unwrap();

    let replaced = student
        .with_subjects(vec![subject("Physics"), subject("Chemistry")])
        .unwrap();
    assert_eq!(replaced.id(), student.id());
    assert_eq!(replaced.subjects().len(), 2);

    let err = replaced.with_subjects(vec![]).unwrap_err();
    assert_eq!(err, StudentEditError::EmptySubjectSet);
}

#[test]
fn with_subject_replaced_checks_slot_and_name_collisions() {
    let student = Student::enroll(
        details("Alice Tan", "91234567"),
        vec![],
        vec![subject("Mathematics"), subject("Physics")],
    )
    .unwrap();

    let out_of_range = student
        .with_subject_replaced(2, subject("Chemistry"))
        .unwrap_err();
    assert_eq!(
        out_of_range,
        StudentEditError::SubjectIndexOutOfRange { index: 3, len: 2 }
    );

    let collision = student
        .with_subject_replaced(1, subject("mathematics"))
        .unwrap_err();
    assert_eq!(
        collision,
        StudentEditError::DuplicateSubject("mathematics".into())
    );

    let replaced = student
        .with_subject_replaced(1, subject("Chemistry"))
        .unwrap();
    assert_eq!(replaced.subjects()[1].name(), "Chemistry");
    assert_eq!(replaced.subjects()[0].name(), "Mathematics");
}

#[test]
fn find_subject_uses_normalized_identity() {
    let student = Student::enroll(
        details("Alice Tan", "91234567"),
        vec![],
        vec![subject("Pure  Math"), subject("Physics")],
    )
    .unwrap();

    let (slot, found) = student.find_subject(" pure math ").unwrap();
    assert_eq!(slot, 0);
    assert_eq!(found.name(), "Pure  Math");
    assert!(student.find_subject("Chemistry").is_none());
}

#[test]
fn identity_uses_normalized_name_and_phone() {
    let left = Student::enroll(
        details("Alice  Tan", "91234567"),
        vec![],
        vec![subject("Mathematics")],
    )
    .unwrap();
    let same = Student::enroll(
        details("alice tan", "91234567"),
        vec![],
        vec![subject("Physics")],
    )
    .unwrap();
    let other_phone = Student::enroll(
        details("Alice Tan", "98765432"),
        vec![],
        vec![subject("Mathematics")],
    )
    .unwrap();

    assert!(left.is_same_student(&same));
    assert!(!left.is_same_student(&other_phone));
    // Full-value equality stays strict: ids and subjects differ.
    assert_ne!(left, same);
}

#[test]
fn payments_append_in_order() {
    let student = Student::enroll(
        details("Alice Tan", "91234567"),
        vec![],
        vec![subject("Mathematics")],
    )
    .unwrap();

    let paid = student
        .with_payment_recorded(Payment {
            amount_cents: 12_000,
            recorded_at: 1_700_000_000_000,
        })
        .with_payment_recorded(Payment {
            amount_cents: 8_500,
            recorded_at: 1_700_100_000_000,
        });

    assert_eq!(paid.id(), student.id());
    assert_eq!(paid.payments().len(), 2);
    assert_eq!(paid.payments()[0].amount_cents, 12_000);
    assert_eq!(paid.payments()[1].amount_cents, 8_500);
}

#[test]
fn student_serialization_round_trips() {
    let mathematics = Subject::with_topics(
        "Mathematics",
        vec![
            SyllabusTopic::new("Integration").unwrap(),
            SyllabusTopic::new("Limits").unwrap().toggled(),
        ],
    )
    .unwrap();
    let student = Student::enroll(
        details("Alice Tan", "91234567"),
        vec!["sec4".into()],
        vec![mathematics],
    )
    .unwrap();

    let json = serde_json::to_value(&student).unwrap();
    assert_eq!(json["details"]["name"], "Alice Tan");
    assert_eq!(json["details"]["phone"], "91234567");
    assert_eq!(json["tags"][0], "sec4");
    assert_eq!(json["subjects"][0]["name"], "Mathematics");
    assert_eq!(json["subjects"][0]["topics"][1]["done"], true);

    let decoded: Student = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, student);
}
