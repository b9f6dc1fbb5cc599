use chrono::{Duration, NaiveDate};
use studyplan::models::{Tag, Task};
use studyplan::views::{self, Category, DateFilter};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 15).unwrap()
}

fn task(id: &str, offset_days: i64, done: bool) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {}", id),
        notes: String::new(),
        tag: Tag::Homework,
        deadline: today() + Duration::days(offset_days),
        is_completed: done,
    }
}

fn sample() -> Vec<Task> {
    vec![
        task("a", 3, false),
        task("b", -2, true),
        task("c", 0, false),
        task("d", -5, false),
        task("e", 0, true),
        task("f", 10, false),
        task("g", 3, false),
    ]
}

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id.as_str()).collect()
}

#[test]
fn test_sort_pending_first_then_deadline() {
    let mut tasks = sample();
    views::sort_tasks(&mut tasks);
    assert_eq!(ids(&tasks), vec!["d", "c", "a", "g", "f", "b", "e"]);
}

#[test]
fn test_sort_is_idempotent() {
    let once = views::sorted(&sample());
    let twice = views::sorted(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_buckets_partition_every_task_once() {
    let tasks = sample();
    let buckets = views::bucket(&tasks, today());

    assert_eq!(ids(&buckets.overdue), vec!["d"]);
    assert_eq!(ids(&buckets.due_today), vec!["c"]);
    assert_eq!(ids(&buckets.upcoming), vec!["a", "f", "g"]);
    // completed wins over the date, even for a past deadline
    assert_eq!(ids(&buckets.completed), vec!["b", "e"]);
    assert_eq!(buckets.len(), tasks.len());

    for t in &tasks {
        let hits = Category::ALL
            .iter()
            .filter(|c| buckets.get(**c).iter().any(|x| x.id == t.id))
            .count();
        assert_eq!(hits, 1, "task {} in {} buckets", t.id, hits);
    }
}

#[test]
fn test_categorize_boundaries() {
    assert_eq!(views::categorize(&task("x", -1, false), today()), Category::Overdue);
    assert_eq!(views::categorize(&task("x", 0, false), today()), Category::DueToday);
    assert_eq!(views::categorize(&task("x", 1, false), today()), Category::Upcoming);
    assert_eq!(views::categorize(&task("x", -1, true), today()), Category::Completed);
}

#[test]
fn test_filter_by_date() {
    let tasks = sample();
    assert_eq!(views::filter_by_date(&tasks, DateFilter::All), tasks);

    let day = today() + Duration::days(3);
    let filtered = views::filter_by_date(&tasks, DateFilter::On(day));
    assert_eq!(ids(&filtered), vec!["a", "g"]);
    assert!(filtered.iter().all(|t| t.deadline == day));

    let empty = views::filter_by_date(&tasks, DateFilter::On(today() + Duration::days(100)));
    assert!(empty.is_empty());
}

#[test]
fn test_filter_by_tag() {
    let mut tasks = sample();
    tasks[1].tag = Tag::Exam;
    tasks[2].tag = Tag::Other("Reading".into());
    assert_eq!(ids(&views::filter_by_tag(&tasks, &Tag::Exam)), vec!["b"]);
    assert_eq!(ids(&views::filter_by_tag(&tasks, &Tag::Other("Reading".into()))), vec!["c"]);
}

#[test]
fn test_summary_counts() {
    let summary = views::summarize(&sample(), today());
    assert_eq!(summary.pending, 5);
    assert_eq!(summary.overdue, 1);
    assert_eq!(summary.completed, 2);

    let empty = views::summarize(&[], today());
    assert_eq!(empty, views::Summary::default());
}

#[test]
fn test_overdue_list() {
    let mut tasks = sample();
    tasks.push(task("h", -1, false));
    let overdue = views::overdue(&tasks, today());
    assert_eq!(ids(&overdue), vec!["d", "h"]);
}

#[test]
fn test_deadline_label() {
    assert_eq!(views::deadline_label(&task("x", 0, false), today()), "DUE TODAY");
    assert_eq!(views::deadline_label(&task("x", -3, false), today()), "OVERDUE");
    assert_eq!(views::deadline_label(&task("x", 15, false), today()), "Nov 30, 2025");
}

#[test]
fn test_date_filter_parse_and_shift() {
    assert_eq!("all".parse::<DateFilter>().unwrap(), DateFilter::All);
    assert_eq!("ALL".parse::<DateFilter>().unwrap(), DateFilter::All);
    assert_eq!("2025-11-15".parse::<DateFilter>().unwrap(), DateFilter::On(today()));
    assert!("11/15/2025".parse::<DateFilter>().is_err());

    let next = DateFilter::All.shift(1, today());
    assert_eq!(next, DateFilter::On(today() + Duration::days(1)));
    assert_eq!(next.shift(-2, today()), DateFilter::On(today() - Duration::days(1)));
    assert_eq!(DateFilter::On(today()).to_string(), "2025-11-15");
}
