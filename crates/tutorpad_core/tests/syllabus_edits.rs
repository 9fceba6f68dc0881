use std::num::NonZeroUsize;
use tutorpad_core::{Subject, SubjectEditError, SyllabusTopic};

fn pos(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).unwrap()
}

fn topic(text: &str) -> SyllabusTopic {
    SyllabusTopic::new(text).unwrap()
}

fn subject(name: &str, topics: &[&str]) -> Subject {
    let topics = topics.iter().map(|text| topic(text)).collect();
    Subject::with_topics(name, topics).unwrap()
}

#[test]
fn add_appends_at_end_and_rejects_duplicate_text() {
    let mathematics = subject("Mathematics", &["Integration"]);

    let grown = mathematics.with_topic_added(topic("Derivatives")).unwrap();
    let texts: Vec<&str> = grown.topics().iter().map(|t| t.text()).collect();
    assert_eq!(texts, vec!["Integration", "Derivatives"]);

    let err = grown.with_topic_added(topic("Integration")).unwrap_err();
    assert_eq!(err, SubjectEditError::DuplicateTopic("Integration".into()));
}

#[test]
fn add_rejects_duplicate_even_when_done_flags_differ() {
    let mathematics = subject("Mathematics", &["Integration"]);
    let completed = topic("Integration").toggled();

    let err = mathematics.with_topic_added(completed).unwrap_err();
    assert_eq!(err, SubjectEditError::DuplicateTopic("Integration".into()));
}

#[test]
fn add_many_rejects_internal_duplicates_before_existing_collisions() {
    let mathematics = subject("Mathematics", &["Integration"]);

    // "Integration" also collides with the existing syllabus, but the
    // internal repetition of "Limits" is reported first.
    let err = mathematics
        .with_topics_added(vec![topic("Limits"), topic("Integration"), topic("Limits")])
        .unwrap_err();
    assert_eq!(err, SubjectEditError::DuplicateTopicInput("Limits".into()));
}

#[test]
fn add_many_is_all_or_nothing_on_existing_collision() {
    let mathematics = subject("Mathematics", &["Integration"]);

    let err = mathematics
        .with_topics_added(vec![topic("Limits"), topic("Integration")])
        .unwrap_err();
    assert_eq!(err, SubjectEditError::DuplicateTopic("Integration".into()));

    // The receiver is untouched; no partial insert of "Limits".
    assert_eq!(mathematics.topics().len(), 1);
}

#[test]
fn add_many_appends_in_request_order() {
    let mathematics = subject("Mathematics", &[]);

    let grown = mathematics
        .with_topics_added(vec![topic("Limits"), topic("Integration")])
        .unwrap();
    let texts: Vec<&str> = grown.topics().iter().map(|t| t.text()).collect();
    assert_eq!(texts, vec!["Limits", "Integration"]);
}

#[test]
fn remove_excises_one_position_and_may_empty_the_syllabus() {
    let physics = subject("Physics", &["Kinematics", "Dynamics"]);

    let shrunk = physics.with_topic_removed(pos(1)).unwrap();
    let texts: Vec<&str> = shrunk.topics().iter().map(|t| t.text()).collect();
    assert_eq!(texts, vec!["Dynamics"]);

    let emptied = shrunk.with_topic_removed(pos(1)).unwrap();
    assert!(emptied.topics().is_empty());
}

#[test]
fn remove_rejects_position_beyond_length() {
    let physics = subject("Physics", &["Kinematics"]);

    let err = physics.with_topic_removed(pos(2)).unwrap_err();
    assert_eq!(
        err,
        SubjectEditError::TopicIndexOutOfRange { index: 2, len: 1 }
    );
}

#[test]
fn edit_replaces_in_place_and_rejects_collisions_with_other_topics() {
    let physics = subject("Physics", &["Kinematics", "Dynamics"]);

    let edited = physics.with_topic_edited(pos(2), topic("Waves")).unwrap();
    let texts: Vec<&str> = edited.topics().iter().map(|t| t.text()).collect();
    assert_eq!(texts, vec!["Kinematics", "Waves"]);

    let err = edited
        .with_topic_edited(pos(2), topic("Kinematics"))
        .unwrap_err();
    assert_eq!(err, SubjectEditError::DuplicateTopic("Kinematics".into()));
}

#[test]
fn edit_allows_rewriting_a_position_with_its_own_text() {
    let physics = subject("Physics", &["Kinematics"]);

    let unchanged = physics
        .with_topic_edited(pos(1), topic("Kinematics"))
        .unwrap();
    assert_eq!(unchanged.topics()[0].text(), "Kinematics");
}

#[test]
fn edit_rejects_position_beyond_length() {
    let physics = subject("Physics", &["Kinematics"]);

    let err = physics.with_topic_edited(pos(3), topic("Waves")).unwrap_err();
    assert_eq!(
        err,
        SubjectEditError::TopicIndexOutOfRange { index: 3, len: 1 }
    );
}

#[test]
fn toggle_flips_done_and_keeps_text_and_order() {
    let physics = subject("Physics", &["Kinematics", "Dynamics"]);

    let toggled = physics.with_topic_toggled(pos(1)).unwrap();
    assert!(toggled.topics()[0].is_done());
    assert_eq!(toggled.topics()[0].text(), "Kinematics");
    assert!(!toggled.topics()[1].is_done());

    let back = toggled.with_topic_toggled(pos(1)).unwrap();
    assert_eq!(back, physics);
}

#[test]
fn toggle_rejects_position_beyond_length() {
    let physics = subject("Physics", &[]);

    let err = physics.with_topic_toggled(pos(1)).unwrap_err();
    assert_eq!(
        err,
        SubjectEditError::TopicIndexOutOfRange { index: 1, len: 0 }
    );
}

#[test]
fn append_merges_without_deduplication() {
    let mathematics = subject("Mathematics", &["Integration"]);

    let merged = mathematics.with_topics_appended(vec![topic("Derivatives"), topic("Integration")]);
    let texts: Vec<&str> = merged.topics().iter().map(|t| t.text()).collect();
    assert_eq!(texts, vec!["Integration", "Derivatives", "Integration"]);
}

#[test]
fn contains_matches_on_text_only() {
    let mathematics = subject("Mathematics", &["Integration"]);

    assert!(mathematics.contains_topic(&topic("Integration")));
    assert!(mathematics.contains_topic(&topic("Integration").toggled()));
    assert!(!mathematics.contains_topic(&topic("Limits")));
}
