mod common;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use studyplan::auth;
use studyplan::models::{Tag, Task};
use studyplan::storage::{demo_tasks, SESSION_KEY, TASKS_KEY};

use common::with_test_store;

fn backup_of(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn task(id: &str, tag: Tag, deadline: (i32, u32, u32), done: bool) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {}", id),
        notes: "some notes".into(),
        tag,
        deadline: NaiveDate::from_ymd_opt(deadline.0, deadline.1, deadline.2).unwrap(),
        is_completed: done,
    }
}

#[test]
fn test_first_load_seeds_and_persists() {
    with_test_store(|store| {
        assert!(store.get_item(TASKS_KEY).unwrap().is_none());

        let first = store.load_tasks().unwrap();
        assert_eq!(first.len(), 7);
        assert_eq!(first, demo_tasks());
        assert!(store.get_item(TASKS_KEY).unwrap().is_some());

        let second = store.load_tasks().unwrap();
        assert_eq!(first, second);
    });
}

#[test]
fn test_demo_tasks_are_well_formed() {
    let tasks = demo_tasks();
    let mut ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), tasks.len());
    assert_eq!(tasks.iter().filter(|t| t.is_completed).count(), 1);
}

#[test]
fn test_save_then_load_round_trip() {
    with_test_store(|store| {
        let tasks = vec![
            task("10", Tag::Exam, (2025, 11, 1), false),
            task("11", Tag::Other("Reading".into()), (2026, 2, 28), true),
        ];
        store.save_tasks(&tasks).unwrap();
        assert_eq!(store.load_tasks().unwrap(), tasks);

        store.save_tasks(&[]).unwrap();
        assert!(store.load_tasks().unwrap().is_empty());
    });
}

#[test]
fn test_stored_schema_field_names() {
    with_test_store(|store| {
        store.save_tasks(&[task("1", Tag::Homework, (2025, 11, 1), false)]).unwrap();
        let raw = store.get_item(TASKS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let record = value[0].as_object().unwrap();

        let mut keys: Vec<&str> = record.keys().map(|k| k.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["deadline", "id", "isCompleted", "notes", "tag", "title"]);
        assert_eq!(record["deadline"], "2025-11-01");
        assert_eq!(record["tag"], "Homework");
        assert_eq!(record["isCompleted"], false);
    });
}

#[test]
fn test_reads_records_written_by_the_app() {
    with_test_store(|store| {
        let raw = r#"[{"id":"1700000000000","title":"Essay","notes":"","tag":"Elective","deadline":"2025-12-01","isCompleted":true}]"#;
        store.set_item(TASKS_KEY, raw).unwrap();
        let tasks = store.load_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].tag, Tag::Other("Elective".into()));
        assert!(tasks[0].is_completed);
    });
}

#[test]
fn test_malformed_tasks_load_as_empty() {
    with_test_store(|store| {
        // an old revision stored non-ISO dates
        let raw = r#"[{"id":"1","title":"x","notes":"","tag":"Exam","deadline":"11/31/2025","isCompleted":false}]"#;
        store.set_item(TASKS_KEY, raw).unwrap();
        assert!(store.load_tasks().unwrap().is_empty());

        store.set_item(TASKS_KEY, "{not json").unwrap();
        assert!(store.load_tasks().unwrap().is_empty());
        // no reseed over existing data
        assert_eq!(store.get_item(TASKS_KEY).unwrap().as_deref(), Some("{not json"));
    });
}

#[test]
fn test_corrupt_store_file_reads_as_empty() {
    with_test_store(|store| {
        fs::write(store.path(), "garbage").unwrap();
        assert!(store.get_item(SESSION_KEY).unwrap().is_none());
        assert!(store.keys().unwrap().is_empty());
    });
}

#[test]
fn test_item_primitives() {
    with_test_store(|store| {
        store.set_item("k", "\"v\"").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("\"v\""));
        assert_eq!(store.get_json::<String>("k").unwrap().as_deref(), Some("v"));

        store.remove_item("k").unwrap();
        assert!(store.get_item("k").unwrap().is_none());
        store.remove_item("k").unwrap();
    });
}

#[test]
fn test_load_task_by_id() {
    with_test_store(|store| {
        store.load_tasks().unwrap();
        assert_eq!(store.load_task("5").unwrap().unwrap().title, "Physics Lab Report");
        assert!(store.load_task("nope").unwrap().is_none());
    });
}

#[test]
fn test_reset_removes_store() {
    with_test_store(|store| {
        store.load_tasks().unwrap();
        assert!(store.path().exists());
        store.reset().unwrap();
        assert!(!store.path().exists());
        store.reset().unwrap();
    });
}

#[test]
fn test_corrupt_store_is_moved_aside_not_overwritten() {
    with_test_store(|store| {
        auth::register(&store, "alice", "", "secret").unwrap();
        let bytes = fs::read(store.path()).unwrap();
        let truncated = &bytes[..bytes.len() - 2];
        fs::write(store.path(), truncated).unwrap();

        assert!(store.load_tasks().unwrap().is_empty());
        // no demo tasks are written over the recovered store
        assert!(!store.path().exists());
        let saved = fs::read(backup_of(store.path(), ".corrupt")).unwrap();
        assert_eq!(saved, truncated);
        assert!(String::from_utf8(saved).unwrap().contains("alice"));

        // a later corruption keeps the first backup
        fs::write(store.path(), "garbage").unwrap();
        assert!(store.keys().unwrap().is_empty());
        assert_eq!(fs::read(backup_of(store.path(), ".corrupt")).unwrap(), truncated);
        assert_eq!(fs::read_to_string(backup_of(store.path(), ".corrupt.1")).unwrap(), "garbage");

        // once moved aside, the store starts over normally
        assert_eq!(store.load_tasks().unwrap().len(), 7);
    });
}

#[test]
fn test_update_writes_once() {
    with_test_store(|store| {
        store.set_item("a", "1").unwrap();
        let removed = store
            .update(|map| {
                map.insert("b".into(), "2".into());
                map.remove("a")
            })
            .unwrap();
        assert_eq!(removed.as_deref(), Some("1"));
        assert_eq!(store.keys().unwrap(), vec!["b".to_string()]);
    });
}
