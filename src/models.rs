use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Format every deadline is stored and compared in.
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Represents a single study task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Opaque identifier assigned at creation. Never changes.
    pub id: String,
    /// What needs doing.
    pub title: String,
    /// Free-text notes, may be empty.
    #[serde(default)]
    pub notes: String,
    /// Category label.
    pub tag: Tag,
    /// Due date, stored as `YYYY-MM-DD`.
    pub deadline: NaiveDate,
    /// Whether the task has been completed.
    #[serde(rename = "isCompleted", default)]
    pub is_completed: bool,
}

/// Category label attached to a task.
///
/// Labels outside the fixed set are kept verbatim as `Other`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum Tag {
    Homework,
    Exam,
    Project,
    Other(String),
}

impl Tag {
    /// The tags offered when creating a task.
    pub const CHOICES: [Tag; 3] = [Tag::Homework, Tag::Exam, Tag::Project];

    pub fn label(&self) -> &str {
        match self {
            Tag::Homework => "Homework",
            Tag::Exam => "Exam",
            Tag::Project => "Project",
            Tag::Other(s) => s,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.label().trim().is_empty()
    }

    /// Lenient parse for user input: known labels match case-insensitively.
    pub fn from_input(s: &str) -> Tag {
        let s = s.trim();
        Tag::CHOICES
            .iter()
            .find(|t| t.label().eq_ignore_ascii_case(s))
            .cloned()
            .unwrap_or_else(|| Tag::Other(s.to_string()))
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Homework" => Tag::Homework,
            "Exam" => Tag::Exam,
            "Project" => Tag::Project,
            _ => Tag::Other(s),
        }
    }
}

impl From<Tag> for String {
    fn from(t: Tag) -> Self {
        match t {
            Tag::Other(s) => s,
            known => known.label().to_string(),
        }
    }
}

impl FromStr for Tag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Tag::from_input(s))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses a deadline typed by the user. Only zero-padded ISO dates are accepted.
pub fn parse_deadline(input: &str) -> Result<NaiveDate, TaskError> {
    let trimmed = input.trim();
    // chrono accepts unpadded fields; the stored form must stay sortable as text
    if trimmed.len() != 10 {
        return Err(TaskError::InvalidDeadline(input.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DEADLINE_FORMAT)
        .map_err(|_| TaskError::InvalidDeadline(input.to_string()))
}

/// Input for creating a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub notes: String,
    pub tag: Tag,
    pub deadline: NaiveDate,
}

/// Partial update of a task. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub tag: Option<Tag>,
    pub deadline: Option<NaiveDate>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.notes.is_none() && self.tag.is_none() && self.deadline.is_none()
    }
}

/// A registered user. `password` holds an argon2 hash, never the plaintext.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
}

/// Profile fields a logged-in user may change.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
