use std::io::{self, Write};

use anyhow::{bail, Context};
use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::auth;
use crate::models::{parse_deadline, NewTask, ProfileUpdate, Tag, Task, TaskEdit};
use crate::storage::Store;
use crate::tasks;
use crate::views::{self, Category, DateFilter};

/// Color used for a tag's badge.
pub fn tag_color(tag: &Tag) -> Color {
    match tag {
        Tag::Homework => Color::Blue,
        Tag::Exam => Color::Red,
        Tag::Project => Color::Magenta,
        Tag::Other(_) => Color::Grey,
    }
}

/// Color used for a task's deadline badge.
pub fn deadline_color(task: &Task, today: NaiveDate) -> Color {
    match views::categorize(task, today) {
        Category::Completed => Color::Grey,
        Category::Overdue => Color::Red,
        Category::DueToday => Color::Yellow,
        Category::Upcoming => Color::Green,
    }
}

fn task_table(tasks: &[Task], today: NaiveDate) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Tag").add_attribute(Attribute::Bold),
            Cell::new("Deadline").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        let status = if t.is_completed { "Done" } else { "Pending" };
        let status_color = if t.is_completed { Color::Green } else { Color::Yellow };
        let mut title = Cell::new(&t.title);
        if t.is_completed {
            title = title.add_attribute(Attribute::CrossedOut);
        }
        table.add_row(vec![
            Cell::new(&t.id),
            title,
            Cell::new(t.tag.label()).fg(tag_color(&t.tag)),
            Cell::new(t.deadline),
            Cell::new(views::deadline_label(t, today)).fg(deadline_color(t, today)),
            Cell::new(status).fg(status_color),
        ]);
    }
    table
}

/// Asks a yes/no question on stdin. Anything but `y` is a no.
pub fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Adds a new task.
pub fn cmd_add(store: &Store, title: String, tag: String, due: String, notes: Option<String>) -> anyhow::Result<()> {
    let deadline = parse_deadline(&due)?;
    let tag = Tag::from_input(&tag);
    let task = tasks::add_task(store, NewTask {
        title,
        notes: notes.unwrap_or_default(),
        tag,
        deadline,
    })?;
    println!("Task added (id = {})", task.id);
    Ok(())
}

/// Lists tasks, incomplete first then by deadline.
///
/// By default, hides completed tasks unless `all` is true.
pub fn cmd_list(store: &Store, date: DateFilter, tag: Option<String>, all: bool) -> anyhow::Result<()> {
    let mut tasks = views::filter_by_date(&store.load_tasks()?, date);
    if let Some(tag) = tag {
        let tag = Tag::from_input(&tag);
        tasks = views::filter_by_tag(&tasks, &tag);
    }
    if !all {
        tasks.retain(|t| !t.is_completed);
    }
    if tasks.is_empty() {
        match date {
            DateFilter::All => println!("No tasks found."),
            DateFilter::On(d) => println!("No tasks found for {}.", views::format_display_date(d)),
        }
        return Ok(());
    }
    views::sort_tasks(&mut tasks);
    println!("{}", task_table(&tasks, views::today()));
    Ok(())
}

/// Prints the schedule: one section per deadline category.
pub fn cmd_schedule(store: &Store, date: DateFilter) -> anyhow::Result<()> {
    let today = views::today();
    let all = views::sorted(&store.load_tasks()?);
    if all.is_empty() {
        println!("No tasks yet. Add your first one with `studyplan add`.");
        return Ok(());
    }
    let filtered = views::filter_by_date(&all, date);
    if let (DateFilter::On(d), true) = (date, filtered.is_empty()) {
        println!("No tasks found for {}.", views::format_display_date(d));
        return Ok(());
    }

    let buckets = views::bucket(&filtered, today);
    for category in Category::ALL {
        let section = buckets.get(category);
        if section.is_empty() {
            continue;
        }
        println!("{} ({})", category.title(), section.len());
        println!("{}", task_table(section, today));
    }
    Ok(())
}

/// Lists overdue tasks, the notification view.
pub fn cmd_overdue(store: &Store) -> anyhow::Result<()> {
    let today = views::today();
    let overdue = views::overdue(&store.load_tasks()?, today);
    if overdue.is_empty() {
        println!("No overdue tasks.");
        return Ok(());
    }
    println!("{}", task_table(&overdue, today));
    Ok(())
}

pub fn cmd_summary(store: &Store) -> anyhow::Result<()> {
    let summary = views::summarize(&store.load_tasks()?, views::today());
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Pending", "Overdue", "Completed"]);
    table.add_row(vec![
        Cell::new(summary.pending).fg(Color::Yellow),
        Cell::new(summary.overdue).fg(if summary.overdue > 0 { Color::Red } else { Color::Reset }),
        Cell::new(summary.completed).fg(Color::Green),
    ]);
    println!("{table}");
    Ok(())
}

/// Shows every field of one task.
pub fn cmd_show(store: &Store, id: &str) -> anyhow::Result<()> {
    let Some(t) = store.load_task(id)? else {
        bail!("Task {} not found.", id);
    };
    let today = views::today();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![Cell::new("ID").add_attribute(Attribute::Bold), Cell::new(&t.id)]);
    table.add_row(vec![Cell::new("Title").add_attribute(Attribute::Bold), Cell::new(&t.title)]);
    table.add_row(vec![Cell::new("Notes").add_attribute(Attribute::Bold), Cell::new(&t.notes)]);
    table.add_row(vec![
        Cell::new("Tag").add_attribute(Attribute::Bold),
        Cell::new(t.tag.label()).fg(tag_color(&t.tag)),
    ]);
    table.add_row(vec![
        Cell::new("Deadline").add_attribute(Attribute::Bold),
        Cell::new(format!("{} ({})", t.deadline, views::deadline_label(&t, today))).fg(deadline_color(&t, today)),
    ]);
    table.add_row(vec![
        Cell::new("Status").add_attribute(Attribute::Bold),
        Cell::new(if t.is_completed { "Done" } else { "Pending" }),
    ]);
    println!("{table}");
    Ok(())
}

/// Flips a task between pending and done.
pub fn cmd_toggle(store: &Store, id: &str) -> anyhow::Result<()> {
    match tasks::toggle_complete(store, id)? {
        Some(t) if t.is_completed => println!("Task {} marked as complete.", id),
        Some(_) => println!("Task {} marked as pending.", id),
        None => bail!("Task {} not found.", id),
    }
    Ok(())
}

/// Edits an existing task's details.
pub fn cmd_edit(
    store: &Store,
    id: &str,
    title: Option<String>,
    notes: Option<String>,
    tag: Option<String>,
    due: Option<String>,
) -> anyhow::Result<()> {
    let edit = TaskEdit {
        title,
        notes,
        tag: tag.as_deref().map(Tag::from_input),
        deadline: due.as_deref().map(parse_deadline).transpose()?,
    };
    if edit.is_empty() {
        println!("Nothing to change.");
        return Ok(());
    }
    tasks::edit_task(store, id, edit)?;
    println!("Task {} updated.", id);
    Ok(())
}

/// Deletes a task after confirmation. Deleting a missing task is not an error.
pub fn cmd_delete(store: &Store, id: &str, force: bool) -> anyhow::Result<()> {
    let Some(task) = store.load_task(id)? else {
        println!("Task {} not found, nothing to delete.", id);
        return Ok(());
    };
    if !force && !confirm(&format!("Delete task '{}'?", task.title))? {
        println!("Aborted.");
        return Ok(());
    }
    if tasks::delete_task(store, id)? {
        println!("Task {} removed.", id);
    }
    Ok(())
}

/// Resets the store, dropping every task, user and the session.
pub fn cmd_reset(store: &Store, force: bool) -> anyhow::Result<()> {
    if !force && !confirm("Are you sure you want to delete all tasks and accounts? This cannot be undone.")? {
        println!("Aborted.");
        return Ok(());
    }
    store.reset().context("failed to reset store")?;
    println!("Store reset successfully.");
    Ok(())
}

pub fn cmd_register(
    store: &Store,
    username: &str,
    email: &str,
    password: &str,
    confirm_password: Option<&str>,
) -> anyhow::Result<()> {
    if let Some(c) = confirm_password {
        auth::check_confirmation(password, c)?;
    }
    let user = auth::register(store, username, email, password)?;
    println!("Account '{}' created! You can now log in.", user.username);
    Ok(())
}

pub fn cmd_login(store: &Store, username: &str, password: &str) -> anyhow::Result<()> {
    let user = auth::login(store, username, password)?;
    println!("Logged in as {}.", user.username);
    Ok(())
}

pub fn cmd_logout(store: &Store) -> anyhow::Result<()> {
    auth::logout(store)?;
    println!("Logged out.");
    Ok(())
}

pub fn cmd_whoami(store: &Store) -> anyhow::Result<()> {
    match auth::current_user(store)? {
        Some(u) if u.email.is_empty() => println!("{}", u.username),
        Some(u) => println!("{} <{}>", u.username, u.email),
        None => println!("Not logged in."),
    }
    Ok(())
}

pub fn cmd_profile(store: &Store, update: ProfileUpdate) -> anyhow::Result<()> {
    if update.username.is_none() && update.email.is_none() && update.password.is_none() {
        return cmd_whoami(store);
    }
    let user = auth::update_profile(store, update)?;
    println!("Profile updated for {}.", user.username);
    Ok(())
}
