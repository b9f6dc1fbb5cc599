use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};
use crate::models::{Tag, Task};
use crate::views::{self, Category, DateFilter};
use super::app::{App, AuthField, AuthMode, DisplayItem, InputField, InputMode, Screen};

const PRIMARY: Color = Color::Cyan;

fn tag_style(tag: &Tag) -> Style {
    let fg = match tag {
        Tag::Homework => Color::Blue,
        Tag::Exam => Color::Red,
        Tag::Project => Color::Magenta,
        Tag::Other(_) => Color::Gray,
    };
    Style::default().fg(fg)
}

fn deadline_style(task: &Task, today: NaiveDate) -> Style {
    let fg = match views::categorize(task, today) {
        Category::Completed => Color::DarkGray,
        Category::Overdue => Color::Red,
        Category::DueToday => Color::Yellow,
        Category::Upcoming => Color::Green,
    };
    Style::default().fg(fg)
}

fn task_row(t: &Task, today: NaiveDate) -> Row<'static> {
    let title_style = if t.is_completed {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };
    Row::new(vec![
        Cell::from(if t.is_completed { "[x]" } else { "[ ]" }),
        Cell::from(t.title.clone()).style(title_style),
        Cell::from(t.tag.label().to_string()).style(tag_style(&t.tag)),
        Cell::from(views::deadline_label(t, today)).style(deadline_style(t, today)),
    ])
}

fn filter_label(filter: DateFilter) -> String {
    match filter {
        DateFilter::All => "All Tasks".to_string(),
        DateFilter::On(d) => views::format_display_date(d),
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Status + help
        ].as_ref())
        .split(f.area());

    render_tabs(f, app, chunks[0]);

    match app.screen {
        Screen::Auth => render_auth(f, app, chunks[1]),
        Screen::Home => render_home(f, app, chunks[1]),
        Screen::Schedule => render_schedule(f, app, chunks[1]),
        Screen::Notifications => render_notifications(f, app, chunks[1]),
        Screen::Profile => render_profile(f, app, chunks[1]),
    }

    render_status(f, app, chunks[2]);

    if app.detail_id.is_some() {
        render_detail(f, app);
    }
    match app.input_mode {
        InputMode::Editing | InputMode::Adding | InputMode::Filtering => render_input(f, app),
        InputMode::Confirming => render_confirm(f, app),
        InputMode::Normal => {}
    }
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    if app.screen == Screen::Auth {
        let title = Paragraph::new("Study Planner - Organize your tasks, boost your productivity")
            .style(Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
        return;
    }
    let titles: Vec<Line> = Screen::TABS
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut label = format!("{} {}", i + 1, s.title());
            if *s == Screen::Notifications && app.summary.overdue > 0 {
                label.push_str(&format!(" ({})", app.summary.overdue));
            }
            Line::from(label)
        })
        .collect();
    let selected = Screen::TABS.iter().position(|s| *s == app.screen).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title("Study Planner"))
        .highlight_style(Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn render_task_table(f: &mut Frame, app: &mut App, area: Rect, title: String) {
    let today = app.today;
    let rows: Vec<Row> = app
        .display_items
        .iter()
        .map(|item| match item {
            DisplayItem::Task(t) => task_row(t, today),
            DisplayItem::SectionHeader(category, count) => {
                let color = match category {
                    Category::Overdue => Color::Red,
                    Category::DueToday => Color::Yellow,
                    Category::Upcoming => Color::Green,
                    Category::Completed => Color::DarkGray,
                };
                Row::new(vec![
                    Cell::from(""),
                    Cell::from(format!("{} ({})", category.title(), count)),
                ])
                .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            }
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["", "Title", "Tag", "Deadline"])
            .style(Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_home(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)].as_ref())
        .split(area);

    let name = app.user.as_ref().map(|u| u.username.as_str()).unwrap_or("there");
    let header = vec![
        Line::from(views::format_header_date(app.today)),
        Line::from(Span::styled(format!("Hey, {}!", name), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(vec![
            Span::styled(format!("Pending: {}", app.summary.pending), Style::default().fg(Color::Yellow)),
            Span::raw("   "),
            Span::styled(format!("Overdue: {}", app.summary.overdue), Style::default().fg(Color::Red)),
            Span::raw("   "),
            Span::styled(format!("Completed: {}", app.summary.completed), Style::default().fg(Color::Green)),
        ]),
        Line::from(format!("Showing: {}", filter_label(app.home_filter))),
    ];
    f.render_widget(Paragraph::new(header).block(Block::default().borders(Borders::ALL)), chunks[0]);

    if app.display_items.is_empty() {
        let msg = match app.home_filter {
            DateFilter::All => "Nothing scheduled. Add a new task with 'a'.".to_string(),
            DateFilter::On(_) => "No tasks found for the selected date.".to_string(),
        };
        render_empty(f, chunks[1], "Tasks", &msg);
        return;
    }
    let title = match app.home_filter {
        DateFilter::All => "All Tasks".to_string(),
        DateFilter::On(_) => "Filtered Tasks".to_string(),
    };
    render_task_table(f, app, chunks[1], title);
}

fn render_schedule(f: &mut Frame, app: &mut App, area: Rect) {
    if app.tasks.is_empty() {
        render_empty(f, area, "Task Schedule", "Press 'a' to add your first task!");
        return;
    }
    if let (DateFilter::On(d), true) = (app.schedule_filter, app.display_items.is_empty()) {
        let msg = format!("No tasks found for {}.", views::format_display_date(d));
        render_empty(f, area, "Task Schedule", &msg);
        return;
    }
    let title = format!("Task Schedule - {}", filter_label(app.schedule_filter));
    render_task_table(f, app, area, title);
}

fn render_notifications(f: &mut Frame, app: &mut App, area: Rect) {
    if app.display_items.is_empty() {
        render_empty(f, area, "Overdue Tasks", "No overdue tasks!");
        return;
    }
    render_task_table(f, app, area, "Overdue Tasks".to_string());
}

fn render_profile(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    if let Some(u) = &app.user {
        lines.push(Line::from(vec![
            Span::styled("Username: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(u.username.clone()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Email:    ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(if u.email.is_empty() { "-".to_string() } else { u.email.clone() }),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(format!("Pending tasks:   {}", app.summary.pending)));
    lines.push(Line::from(format!("Overdue tasks:   {}", app.summary.overdue)));
    lines.push(Line::from(format!("Completed tasks: {}", app.summary.completed)));

    let profile = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Profile"));
    f.render_widget(profile, area);
}

fn render_auth(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.auth_form;
    let heading = match form.mode {
        AuthMode::Login => "Login",
        AuthMode::Register => "Register",
    };
    let mut lines = vec![
        Line::from(Span::styled(heading, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];
    for field in form.fields() {
        let label = match field {
            AuthField::Username => "Username",
            AuthField::Email => "Email",
            AuthField::Password => "Password",
            AuthField::Confirm => "Confirm Password",
        };
        let value = match field {
            AuthField::Password | AuthField::Confirm => "*".repeat(form.value(*field).chars().count()),
            _ => form.value(*field).to_string(),
        };
        let style = if *field == form.focused() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>17}: ", label), style),
            Span::styled(value, style),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(match form.mode {
        AuthMode::Login => "No account? Press Left/Right to register.",
        AuthMode::Register => "Already have an account? Press Left/Right to log in.",
    }));

    let area = centered_rect(60, 12, area);
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(heading));
    f.render_widget(widget, area);
}

fn render_empty(f: &mut Frame, area: Rect, title: &str, msg: &str) {
    let p = Paragraph::new(msg.to_string())
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(p, area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.input_mode {
        InputMode::Normal => match app.screen {
            _ if app.detail_id.is_some() => "Esc: Back | n: Title | o: Notes | g: Tag | t: Deadline | Space: Done | d: Del",
            Screen::Auth => "Enter: Submit | Tab: Next Field | Left/Right: Login/Register | Esc: Quit",
            Screen::Home => "q: Quit | Tab: Screen | a: Add | Enter: Details | Space: Done | d: Del | [ ]: Day | .: Today | f: Date | x: All",
            Screen::Schedule => "q: Quit | Tab: Screen | a: Add | Enter: Details | Space: Done | d: Del | f: Filter | x: Clear",
            Screen::Notifications => "q: Quit | Tab: Screen | Enter: Details | d: Del",
            Screen::Profile => "q: Quit | Tab: Screen | u: Username | e: Email | p: Password | o: Logout",
        },
        InputMode::Editing | InputMode::Filtering => "Enter: Save | Esc: Cancel",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
        InputMode::Confirming => "y: Delete | n: Cancel",
    };

    let text = match &app.message {
        Some(m) => format!("{}  |  {}", m, help_text),
        None => help_text.to_string(),
    };
    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, area);
}

fn render_detail(f: &mut Frame, app: &App) {
    let Some(t) = app.detail_task() else { return; };
    let label = |s: &'static str| Span::styled(s, Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let lines = vec![
        Line::from(Span::styled(t.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(label("Notes")),
        Line::from(if t.notes.is_empty() { "-".to_string() } else { t.notes.clone() }),
        Line::from(""),
        Line::from(vec![label("Tag       "), Span::styled(t.tag.label().to_string(), tag_style(&t.tag))]),
        Line::from(vec![
            label("Deadline  "),
            Span::raw(format!("{}  ", t.deadline)),
            Span::styled(views::deadline_label(t, app.today), deadline_style(t, app.today)),
        ]),
        Line::from(vec![label("Status    "), Span::raw(if t.is_completed { "Done" } else { "Pending" })]),
    ];

    let area = centered_rect(70, 12, f.area());
    f.render_widget(Clear, area);
    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Task Details"));
    f.render_widget(detail, area);
}

fn render_confirm(f: &mut Frame, app: &App) {
    let title = app
        .pending_delete
        .as_deref()
        .and_then(|id| app.tasks.iter().find(|t| t.id == id))
        .map(|t| t.title.clone())
        .unwrap_or_default();
    let area = centered_rect(50, 4, f.area());
    f.render_widget(Clear, area);
    let confirm = Paragraph::new(vec![
        Line::from("Are you sure you want to delete this task?"),
        Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD))),
    ])
    .style(Style::default().fg(Color::Red))
    .block(Block::default().borders(Borders::ALL).title("Delete Task (y/n)"));
    f.render_widget(confirm, area);
}

fn render_input(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
    f.render_widget(Clear, area); // Clear the area first

    let title = match app.input_mode {
        InputMode::Adding => match app.add_state.step {
            0 => "Add Task: Enter Title",
            1 => "Add Task: Enter Notes (Optional)",
            2 => "Add Task: Tag (1 Homework, 2 Exam, 3 Project)",
            3 => "Add Task: Enter Deadline (YYYY-MM-DD)",
            _ => "Add Task",
        },
        InputMode::Filtering => "Filter by Date (YYYY-MM-DD, empty for all)",
        InputMode::Editing => match app.input_field {
            InputField::Title => "Edit Title",
            InputField::Notes => "Edit Notes",
            InputField::Tag => "Edit Tag",
            InputField::Deadline => "Edit Deadline (YYYY-MM-DD)",
            InputField::Username => "Edit Username",
            InputField::Email => "Edit Email",
            InputField::Password => "New Password",
            InputField::None => "Edit",
        },
        _ => "",
    };

    let shown = if app.input_field == InputField::Password && app.input_mode == InputMode::Editing {
        "*".repeat(app.input_buffer.chars().count())
    } else {
        app.input_buffer.clone()
    };
    let input = Paragraph::new(shown)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(input, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
