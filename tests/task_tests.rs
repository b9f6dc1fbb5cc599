mod common;

use chrono::NaiveDate;
use studyplan::models::{parse_deadline, NewTask, Tag, TaskEdit};
use studyplan::tasks::{add_task, delete_task, edit_task, toggle_complete};
use studyplan::TaskError;

use common::with_test_store;

fn date(s: &str) -> NaiveDate {
    parse_deadline(s).unwrap()
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.into(),
        notes: String::new(),
        tag: Tag::Homework,
        deadline: date("2025-11-01"),
    }
}

#[test]
fn test_add_task() {
    with_test_store(|store| {
        let before = store.load_tasks().unwrap();
        let added = add_task(&store, new_task("X")).unwrap();

        let after = store.load_tasks().unwrap();
        assert_eq!(after.len(), before.len() + 1);
        assert!(!added.is_completed);
        assert_eq!(added.tag, Tag::Homework);
        assert_eq!(added.deadline, date("2025-11-01"));
        assert_eq!(after.iter().filter(|t| t.id == added.id).count(), 1);
    });
}

#[test]
fn test_added_ids_are_unique() {
    with_test_store(|store| {
        let a = add_task(&store, new_task("A")).unwrap();
        let b = add_task(&store, new_task("B")).unwrap();
        let c = add_task(&store, new_task("C")).unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_ne!(a.id, c.id);
    });
}

#[test]
fn test_add_requires_title_and_tag() {
    with_test_store(|store| {
        let before = store.load_tasks().unwrap();

        let err = add_task(&store, new_task("   ")).unwrap_err();
        assert!(matches!(err, TaskError::MissingTitle));

        let mut untagged = new_task("Essay");
        untagged.tag = Tag::Other(String::new());
        let err = add_task(&store, untagged).unwrap_err();
        assert!(matches!(err, TaskError::MissingTag));

        assert_eq!(store.load_tasks().unwrap(), before);
    });
}

#[test]
fn test_toggle_twice_restores_task() {
    with_test_store(|store| {
        let original = store.load_task("2").unwrap().unwrap();

        let toggled = toggle_complete(&store, "2").unwrap().unwrap();
        assert_eq!(toggled.is_completed, !original.is_completed);

        toggle_complete(&store, "2").unwrap();
        assert_eq!(store.load_task("2").unwrap().unwrap(), original);
    });
}

#[test]
fn test_toggle_unknown_task() {
    with_test_store(|store| {
        let before = store.load_tasks().unwrap();
        assert!(toggle_complete(&store, "missing").unwrap().is_none());
        assert_eq!(store.load_tasks().unwrap(), before);
    });
}

#[test]
fn test_delete_task_is_idempotent() {
    with_test_store(|store| {
        let before = store.load_tasks().unwrap();

        assert!(delete_task(&store, "5").unwrap());
        let after = store.load_tasks().unwrap();
        assert!(after.iter().all(|t| t.id != "5"));
        let expected: Vec<_> = before.into_iter().filter(|t| t.id != "5").collect();
        assert_eq!(after, expected);

        assert!(!delete_task(&store, "5").unwrap());
        assert_eq!(store.load_tasks().unwrap(), expected);
    });
}

#[test]
fn test_edit_task() {
    with_test_store(|store| {
        let edited = edit_task(&store, "1", TaskEdit {
            title: Some("Math 5.3".into()),
            deadline: Some(date("2025-12-10")),
            ..TaskEdit::default()
        }).unwrap();
        assert_eq!(edited.title, "Math 5.3");
        assert_eq!(edited.deadline, date("2025-12-10"));

        let stored = store.load_task("1").unwrap().unwrap();
        assert_eq!(stored, edited);
        assert_eq!(stored.tag, Tag::Homework);
    });
}

#[test]
fn test_edit_rejects_bad_input() {
    with_test_store(|store| {
        let before = store.load_tasks().unwrap();

        let err = edit_task(&store, "1", TaskEdit { title: Some("".into()), ..TaskEdit::default() }).unwrap_err();
        assert!(matches!(err, TaskError::MissingTitle));

        let err = edit_task(&store, "nope", TaskEdit { notes: Some("x".into()), ..TaskEdit::default() }).unwrap_err();
        assert!(matches!(err, TaskError::NotFound(id) if id == "nope"));

        assert_eq!(store.load_tasks().unwrap(), before);
    });
}

#[test]
fn test_parse_deadline_only_accepts_padded_iso() {
    assert_eq!(parse_deadline("2025-01-05").unwrap(), NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    assert_eq!(parse_deadline(" 2025-01-05 ").unwrap(), NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    assert!(parse_deadline("2025-1-5").is_err());
    assert!(parse_deadline("11/31/2025").is_err());
    assert!(parse_deadline("2025-02-30").is_err());
    assert!(parse_deadline("").is_err());
}

#[test]
fn test_tag_input_parsing() {
    assert_eq!(Tag::from_input("exam"), Tag::Exam);
    assert_eq!(Tag::from_input(" Project "), Tag::Project);
    assert_eq!(Tag::from_input("Lab"), Tag::Other("Lab".into()));
}
