//! Derived views over a task list.
//!
//! Everything here is pure: callers load the collection, pass in the date
//! they consider "today" (computed once per render pass), and get back a
//! new ordering, subset, or count.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};

use crate::error::TaskError;
use crate::models::{parse_deadline, Tag, Task};

/// Today's date on the local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Sorts incomplete tasks before completed ones, each group by ascending deadline.
///
/// The sort is stable, so tasks sharing a deadline keep their relative order.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.is_completed
            .cmp(&b.is_completed)
            .then_with(|| a.deadline.cmp(&b.deadline))
    });
}

/// Returns a sorted copy.
pub fn sorted(tasks: &[Task]) -> Vec<Task> {
    let mut out = tasks.to_vec();
    sort_tasks(&mut out);
    out
}

/// Which deadlines a list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    On(NaiveDate),
}

impl DateFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            DateFilter::All => true,
            DateFilter::On(d) => task.deadline == *d,
        }
    }

    /// Moves a day filter by `days`; `All` starts from `today`.
    pub fn shift(self, days: i64, today: NaiveDate) -> DateFilter {
        let base = match self {
            DateFilter::All => today,
            DateFilter::On(d) => d,
        };
        DateFilter::On(base + chrono::Duration::days(days))
    }
}

impl FromStr for DateFilter {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(DateFilter::All);
        }
        parse_deadline(s).map(DateFilter::On)
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFilter::All => f.write_str("all"),
            DateFilter::On(d) => write!(f, "{}", d),
        }
    }
}

/// Tasks whose deadline matches the filter, in input order.
pub fn filter_by_date(tasks: &[Task], filter: DateFilter) -> Vec<Task> {
    tasks.iter().filter(|t| filter.matches(t)).cloned().collect()
}

pub fn filter_by_tag(tasks: &[Task], tag: &Tag) -> Vec<Task> {
    tasks.iter().filter(|t| &t.tag == tag).cloned().collect()
}

/// Deadline category of a task. Completion takes priority over the date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Overdue,
    DueToday,
    Upcoming,
    Completed,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Overdue,
        Category::DueToday,
        Category::Upcoming,
        Category::Completed,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Category::Overdue => "Overdue",
            Category::DueToday => "Today's Focus",
            Category::Upcoming => "Upcoming",
            Category::Completed => "Completed",
        }
    }
}

pub fn categorize(task: &Task, today: NaiveDate) -> Category {
    if task.is_completed {
        Category::Completed
    } else if task.deadline < today {
        Category::Overdue
    } else if task.deadline == today {
        Category::DueToday
    } else {
        Category::Upcoming
    }
}

/// A partition of a task list into the four categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    pub overdue: Vec<Task>,
    pub due_today: Vec<Task>,
    pub upcoming: Vec<Task>,
    pub completed: Vec<Task>,
}

impl Buckets {
    pub fn get(&self, category: Category) -> &[Task] {
        match category {
            Category::Overdue => &self.overdue,
            Category::DueToday => &self.due_today,
            Category::Upcoming => &self.upcoming,
            Category::Completed => &self.completed,
        }
    }

    pub fn len(&self) -> usize {
        self.overdue.len() + self.due_today.len() + self.upcoming.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Places every task in exactly one bucket, keeping input order within each.
pub fn bucket(tasks: &[Task], today: NaiveDate) -> Buckets {
    let mut out = Buckets::default();
    for t in tasks {
        let slot = match categorize(t, today) {
            Category::Overdue => &mut out.overdue,
            Category::DueToday => &mut out.due_today,
            Category::Upcoming => &mut out.upcoming,
            Category::Completed => &mut out.completed,
        };
        slot.push(t.clone());
    }
    out
}

/// Counts shown on the dashboard and profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub pending: usize,
    pub overdue: usize,
    pub completed: usize,
}

pub fn summarize(tasks: &[Task], today: NaiveDate) -> Summary {
    tasks.iter().fold(Summary::default(), |mut s, t| {
        if t.is_completed {
            s.completed += 1;
        } else {
            s.pending += 1;
            if t.deadline < today {
                s.overdue += 1;
            }
        }
        s
    })
}

/// Incomplete tasks past their deadline, oldest deadline first.
pub fn overdue(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    let mut out: Vec<Task> = tasks
        .iter()
        .filter(|t| categorize(t, today) == Category::Overdue)
        .cloned()
        .collect();
    sort_tasks(&mut out);
    out
}

/// Badge text shown next to a task's deadline.
pub fn deadline_label(task: &Task, today: NaiveDate) -> String {
    if task.deadline == today {
        "DUE TODAY".to_string()
    } else if task.deadline < today {
        "OVERDUE".to_string()
    } else {
        format_display_date(task.deadline)
    }
}

/// `Nov 30, 2025`
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `16, October 2026`, as in the home header.
pub fn format_header_date(date: NaiveDate) -> String {
    date.format("%d, %B %Y").to_string()
}
