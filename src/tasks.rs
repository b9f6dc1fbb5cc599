use chrono::Utc;
use tracing::{debug, info};

use crate::error::TaskError;
use crate::models::{NewTask, Task, TaskEdit};
use crate::storage::Store;

/// Creates a task and persists the whole collection.
///
/// Title and tag are required. The id is the creation time in milliseconds,
/// bumped until no existing task shares it.
#[tracing::instrument(skip(store, new), fields(title = %new.title))]
pub fn add_task(store: &Store, new: NewTask) -> Result<Task, TaskError> {
    let title = new.title.trim().to_string();
    if title.is_empty() {
        return Err(TaskError::MissingTitle);
    }
    if new.tag.is_empty() {
        return Err(TaskError::MissingTag);
    }

    let mut tasks = store.load_tasks()?;
    let id = next_id(&tasks, Utc::now().timestamp_millis());
    let task = Task {
        id,
        title,
        notes: new.notes.trim().to_string(),
        tag: new.tag,
        deadline: new.deadline,
        is_completed: false,
    };
    tasks.insert(0, task.clone());
    store.save_tasks(&tasks)?;
    info!(id = %task.id, "task added");
    Ok(task)
}

fn next_id(tasks: &[Task], now_millis: i64) -> String {
    let mut candidate = now_millis;
    loop {
        let id = candidate.to_string();
        if !tasks.iter().any(|t| t.id == id) {
            return id;
        }
        candidate += 1;
    }
}

/// Flips the completion flag of a task.
///
/// Returns the updated task, or `None` if no task has that id.
#[tracing::instrument(skip(store))]
pub fn toggle_complete(store: &Store, id: &str) -> Result<Option<Task>, TaskError> {
    let mut tasks = store.load_tasks()?;
    let Some(t) = tasks.iter_mut().find(|t| t.id == id) else {
        debug!("toggle on unknown task ignored");
        return Ok(None);
    };
    t.is_completed = !t.is_completed;
    let updated = t.clone();
    store.save_tasks(&tasks)?;
    info!(completed = updated.is_completed, "task toggled");
    Ok(Some(updated))
}

/// Applies a partial edit to a task.
#[tracing::instrument(skip(store, edit))]
pub fn edit_task(store: &Store, id: &str, edit: TaskEdit) -> Result<Task, TaskError> {
    if let Some(title) = &edit.title {
        if title.trim().is_empty() {
            return Err(TaskError::MissingTitle);
        }
    }
    if let Some(tag) = &edit.tag {
        if tag.is_empty() {
            return Err(TaskError::MissingTag);
        }
    }

    let mut tasks = store.load_tasks()?;
    let t = tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    if let Some(title) = edit.title { t.title = title.trim().to_string(); }
    if let Some(notes) = edit.notes { t.notes = notes.trim().to_string(); }
    if let Some(tag) = edit.tag { t.tag = tag; }
    if let Some(deadline) = edit.deadline { t.deadline = deadline; }
    let updated = t.clone();
    store.save_tasks(&tasks)?;
    info!("task updated");
    Ok(updated)
}

/// Removes a task.
///
/// Returns `false`, without writing, when no task has that id.
#[tracing::instrument(skip(store))]
pub fn delete_task(store: &Store, id: &str) -> Result<bool, TaskError> {
    let mut tasks = store.load_tasks()?;
    let len_before = tasks.len();
    tasks.retain(|t| t.id != id);
    if tasks.len() == len_before {
        debug!("delete on unknown task ignored");
        return Ok(false);
    }
    store.save_tasks(&tasks)?;
    info!("task deleted");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::models::Tag;

    fn task(id: &str) -> Task {
        Task {
            id: id.into(),
            title: "t".into(),
            notes: String::new(),
            tag: Tag::Exam,
            deadline: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            is_completed: false,
        }
    }

    #[test]
    fn next_id_skips_taken_timestamps() {
        let tasks = vec![task("100"), task("101")];
        assert_eq!(next_id(&tasks, 100), "102");
        assert_eq!(next_id(&tasks, 50), "50");
    }
}
