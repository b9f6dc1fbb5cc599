use std::fmt::Display;

use chrono::NaiveDate;
use ratatui::widgets::TableState;
use tracing::warn;

use crate::auth;
use crate::models::{parse_deadline, NewTask, ProfileUpdate, Tag, Task, TaskEdit, User};
use crate::storage::Store;
use crate::tasks;
use crate::views::{self, Category, DateFilter, Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Home,
    Schedule,
    Notifications,
    Profile,
}

impl Screen {
    /// Screens reachable from the tab bar, in order.
    pub const TABS: [Screen; 4] = [Screen::Home, Screen::Schedule, Screen::Notifications, Screen::Profile];

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Auth => "Login",
            Screen::Home => "Home",
            Screen::Schedule => "Schedule",
            Screen::Notifications => "Notifications",
            Screen::Profile => "Profile",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
    Filtering,
    Confirming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    None,
    Title,
    Notes,
    Tag,
    Deadline,
    Username,
    Email,
    Password,
}

pub enum DisplayItem {
    Task(Task),
    SectionHeader(Category, usize),
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub title: String,
    pub notes: String,
    pub tag: Option<Tag>,
    pub step: usize, // 0: Title, 1: Notes, 2: Tag, 3: Deadline
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Username,
    Email,
    Password,
    Confirm,
}

/// The login / register form.
#[derive(Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub focus: usize,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
}

impl AuthForm {
    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Login => &[AuthField::Username, AuthField::Password],
            AuthMode::Register => &[AuthField::Username, AuthField::Email, AuthField::Password, AuthField::Confirm],
        }
    }

    pub fn focused(&self) -> AuthField {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn value(&self, field: AuthField) -> &str {
        match field {
            AuthField::Username => &self.username,
            AuthField::Email => &self.email,
            AuthField::Password => &self.password,
            AuthField::Confirm => &self.confirm,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focused() {
            AuthField::Username => &mut self.username,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
            AuthField::Confirm => &mut self.confirm,
        }
    }

    pub fn push(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn pop(&mut self) {
        self.focused_mut().pop();
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn previous_field(&mut self) {
        let n = self.fields().len();
        self.focus = (self.focus + n - 1) % n;
    }

    pub fn switch_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.focus = 0;
        self.password.clear();
        self.confirm.clear();
    }

    fn is_incomplete(&self) -> bool {
        self.fields().iter().any(|f| self.value(*f).trim().is_empty())
    }
}

pub struct App {
    pub store: Store,
    pub screen: Screen,
    pub user: Option<User>,
    pub today: NaiveDate,
    /// Full collection as of the last focus, sorted.
    pub tasks: Vec<Task>,
    pub display_items: Vec<DisplayItem>,
    pub summary: Summary,
    pub state: TableState,
    pub home_filter: DateFilter,
    pub schedule_filter: DateFilter,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub add_state: AddState,
    pub auth_form: AuthForm,
    /// Task shown in the detail view.
    pub detail_id: Option<String>,
    /// Task awaiting delete confirmation.
    pub pending_delete: Option<String>,
    /// Last status or validation message.
    pub message: Option<String>,
    pub should_quit: bool,
}

impl App {
    /// Creates the app and focuses the first screen: Home with a session, Auth without.
    pub fn new(store: Store) -> App {
        let mut app = App {
            store,
            screen: Screen::Auth,
            user: None,
            today: views::today(),
            tasks: Vec::new(),
            display_items: Vec::new(),
            summary: Summary::default(),
            state: TableState::default(),
            home_filter: DateFilter::All,
            schedule_filter: DateFilter::All,
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            add_state: AddState::default(),
            auth_form: AuthForm::default(),
            detail_id: None,
            pending_delete: None,
            message: None,
            should_quit: false,
        };
        match auth::current_user(&app.store) {
            Ok(Some(user)) => {
                app.user = Some(user);
                app.focus(Screen::Home);
            }
            Ok(None) => app.focus(Screen::Auth),
            Err(e) => {
                app.report(e);
                app.focus(Screen::Auth);
            }
        }
        app
    }

    fn report(&mut self, msg: impl Display) {
        let msg = msg.to_string();
        warn!(screen = ?self.screen, %msg, "reported to user");
        self.message = Some(msg);
    }

    fn notify(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    /// Switches to `screen` and reloads it from the store.
    pub fn focus(&mut self, screen: Screen) {
        if screen != Screen::Auth && self.user.is_none() {
            self.screen = Screen::Auth;
        } else {
            self.screen = screen;
        }
        self.detail_id = None;
        self.pending_delete = None;
        self.input_mode = InputMode::Normal;
        self.state.select(None);
        self.reload();
    }

    pub fn next_tab(&mut self) {
        let idx = Screen::TABS.iter().position(|s| *s == self.screen).map_or(0, |i| (i + 1) % Screen::TABS.len());
        self.focus(Screen::TABS[idx]);
    }

    pub fn previous_tab(&mut self) {
        let n = Screen::TABS.len();
        let idx = Screen::TABS.iter().position(|s| *s == self.screen).map_or(0, |i| (i + n - 1) % n);
        self.focus(Screen::TABS[idx]);
    }

    /// Reloads the collection from the store and rebuilds the focused screen's list.
    pub fn reload(&mut self) {
        self.today = views::today();
        if self.screen == Screen::Auth {
            self.tasks.clear();
            self.display_items.clear();
            self.state.select(None);
            return;
        }

        let loaded = self.store.load_tasks();
        match loaded {
            Ok(tasks) => self.tasks = views::sorted(&tasks),
            Err(e) => {
                self.tasks.clear();
                self.report(e);
            }
        }
        self.summary = views::summarize(&self.tasks, self.today);
        self.rebuild();
    }

    /// Rebuilds the display list from the loaded collection without touching the store.
    pub fn rebuild(&mut self) {
        self.display_items.clear();
        match self.screen {
            Screen::Home => {
                for t in views::filter_by_date(&self.tasks, self.home_filter) {
                    self.display_items.push(DisplayItem::Task(t));
                }
            }
            Screen::Schedule => {
                let filtered = views::filter_by_date(&self.tasks, self.schedule_filter);
                let buckets = views::bucket(&filtered, self.today);
                for category in Category::ALL {
                    let section = buckets.get(category);
                    if section.is_empty() {
                        continue;
                    }
                    self.display_items.push(DisplayItem::SectionHeader(category, section.len()));
                    for t in section {
                        self.display_items.push(DisplayItem::Task(t.clone()));
                    }
                }
            }
            Screen::Notifications => {
                for t in views::overdue(&self.tasks, self.today) {
                    self.display_items.push(DisplayItem::Task(t));
                }
            }
            Screen::Profile | Screen::Auth => {}
        }

        if self.display_items.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.display_items.len() {
                self.state.select(Some(self.display_items.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Selects the next item in the current list.
    pub fn next(&mut self) {
        if self.display_items.is_empty() { return; }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= self.display_items.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous item in the current list.
    pub fn previous(&mut self) {
        if self.display_items.is_empty() { return; }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.display_items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let i = self.state.selected()?;
        match self.display_items.get(i)? {
            DisplayItem::Task(t) => Some(t),
            DisplayItem::SectionHeader(..) => None,
        }
    }

    /// The task shown in the detail view, as of the last reload.
    pub fn detail_task(&self) -> Option<&Task> {
        let id = self.detail_id.as_deref()?;
        self.tasks.iter().find(|t| t.id == id)
    }

    /// The task actions apply to: the open detail, otherwise the selection.
    fn target_id(&self) -> Option<String> {
        match &self.detail_id {
            Some(id) => Some(id.clone()),
            None => self.selected_task().map(|t| t.id.clone()),
        }
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.target_id() else { return; };
        match tasks::toggle_complete(&self.store, &id) {
            Ok(Some(_)) => {}
            Ok(None) => self.notify(format!("Task {} no longer exists.", id)),
            Err(e) => self.report(e),
        }
        self.reload();
    }

    /// Asks for confirmation before deleting the target task.
    pub fn request_delete(&mut self) {
        if let Some(id) = self.target_id() {
            self.pending_delete = Some(id);
            self.input_mode = InputMode::Confirming;
        }
    }

    /// Resolves a pending delete. Declining leaves everything untouched.
    pub fn confirm_delete(&mut self, accept: bool) {
        self.input_mode = InputMode::Normal;
        let Some(id) = self.pending_delete.take() else { return; };
        if !accept {
            return;
        }
        match tasks::delete_task(&self.store, &id) {
            Ok(_) => {
                if self.detail_id.as_deref() == Some(id.as_str()) {
                    self.detail_id = None;
                }
                self.notify("Task has been deleted!");
            }
            Err(e) => self.report(e),
        }
        self.reload();
    }

    pub fn open_detail(&mut self) {
        if let Some(id) = self.selected_task().map(|t| t.id.clone()) {
            self.detail_id = Some(id);
        }
    }

    /// Leaves the detail view; the list underneath is refreshed like a refocus.
    pub fn close_detail(&mut self) {
        self.detail_id = None;
        self.reload();
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        if !matches!(self.screen, Screen::Home | Screen::Schedule) { return; }
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    /// Initiates editing of a field of the detail task or the profile.
    pub fn start_edit(&mut self, field: InputField) {
        let prefill = match field {
            InputField::Title | InputField::Notes | InputField::Tag | InputField::Deadline => {
                let Some(t) = self.detail_task() else { return; };
                match field {
                    InputField::Title => t.title.clone(),
                    InputField::Notes => t.notes.clone(),
                    InputField::Tag => t.tag.label().to_string(),
                    _ => t.deadline.to_string(),
                }
            }
            InputField::Username | InputField::Email | InputField::Password => {
                if self.screen != Screen::Profile { return; }
                let Some(u) = &self.user else { return; };
                match field {
                    InputField::Username => u.username.clone(),
                    InputField::Email => u.email.clone(),
                    _ => String::new(),
                }
            }
            InputField::None => return,
        };
        self.input_field = field;
        self.input_mode = InputMode::Editing;
        self.input_buffer = prefill;
    }

    /// Begins typing a date filter for Home or Schedule.
    pub fn start_filter(&mut self) {
        let Some(current) = self.current_filter() else { return; };
        self.input_mode = InputMode::Filtering;
        self.input_buffer = match current {
            DateFilter::All => String::new(),
            DateFilter::On(d) => d.to_string(),
        };
    }

    pub fn current_filter(&self) -> Option<DateFilter> {
        match self.screen {
            Screen::Home => Some(self.home_filter),
            Screen::Schedule => Some(self.schedule_filter),
            _ => None,
        }
    }

    pub fn set_filter(&mut self, filter: DateFilter) {
        match self.screen {
            Screen::Home => self.home_filter = filter,
            Screen::Schedule => self.schedule_filter = filter,
            _ => return,
        }
        self.state.select(None);
        self.rebuild();
    }

    /// Moves the day filter by `days`, starting from today when showing all.
    pub fn shift_filter(&mut self, days: i64) {
        if let Some(f) = self.current_filter() {
            self.set_filter(f.shift(days, self.today));
        }
    }

    pub fn shift_filter_to_today(&mut self) {
        if self.current_filter().is_some() {
            self.set_filter(DateFilter::On(self.today));
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
    }

    /// Handles Enter based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            InputMode::Filtering => self.handle_filter_input(),
            _ => {}
        }
    }

    /// Handles input for the "Add Task" wizard.
    fn handle_adding_input(&mut self) {
        let input = self.input_buffer.trim().to_string();
        match self.add_state.step {
            0 => { // Title
                if input.is_empty() {
                    self.notify("Title is required.");
                    return;
                }
                self.add_state.title = input;
                self.add_state.step += 1;
            }
            1 => { // Notes
                self.add_state.notes = input;
                self.add_state.step += 1;
            }
            2 => { // Tag, by number or name
                let tag = match input.as_str() {
                    "" => {
                        self.notify("Tag is required.");
                        return;
                    }
                    "1" | "2" | "3" => input
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| Tag::CHOICES.get(n - 1).cloned())
                        .unwrap_or(Tag::Homework),
                    other => Tag::from_input(other),
                };
                self.add_state.tag = Some(tag);
                self.add_state.step += 1;
            }
            3 => { // Deadline
                let deadline = match parse_deadline(&input) {
                    Ok(d) => d,
                    Err(e) => {
                        self.report(e);
                        return;
                    }
                };
                let Some(tag) = self.add_state.tag.clone() else {
                    self.add_state.step = 2;
                    return;
                };
                let new = NewTask {
                    title: self.add_state.title.clone(),
                    notes: self.add_state.notes.clone(),
                    tag,
                    deadline,
                };
                match tasks::add_task(&self.store, new) {
                    Ok(t) => self.notify(format!("Task '{}' added.", t.title)),
                    Err(e) => self.report(e),
                }
                self.input_mode = InputMode::Normal;
                self.reload();
            }
            _ => {}
        }
        self.input_buffer.clear();
    }

    /// Handles input for the edit box.
    fn handle_editing_input(&mut self) {
        let value = self.input_buffer.clone();
        let result = match self.input_field {
            InputField::Title | InputField::Notes | InputField::Tag | InputField::Deadline => {
                let Some(id) = self.detail_id.clone() else {
                    self.cancel_input();
                    return;
                };
                let edit = match self.input_field {
                    InputField::Title => Ok(TaskEdit { title: Some(value), ..TaskEdit::default() }),
                    InputField::Notes => Ok(TaskEdit { notes: Some(value), ..TaskEdit::default() }),
                    InputField::Tag => Ok(TaskEdit { tag: Some(Tag::from_input(&value)), ..TaskEdit::default() }),
                    _ => parse_deadline(&value).map(|d| TaskEdit { deadline: Some(d), ..TaskEdit::default() }),
                };
                edit.and_then(|e| tasks::edit_task(&self.store, &id, e))
                    .map(|_| "Task updated!".to_string())
                    .map_err(|e| e.to_string())
            }
            InputField::Username | InputField::Email | InputField::Password => {
                let update = match self.input_field {
                    InputField::Username => ProfileUpdate { username: Some(value), ..ProfileUpdate::default() },
                    InputField::Email => ProfileUpdate { email: Some(value), ..ProfileUpdate::default() },
                    _ => ProfileUpdate { password: Some(value), ..ProfileUpdate::default() },
                };
                match auth::update_profile(&self.store, update) {
                    Ok(u) => {
                        self.user = Some(u);
                        Ok("Profile updated!".to_string())
                    }
                    Err(e) => Err(e.to_string()),
                }
            }
            InputField::None => Ok(String::new()),
        };
        match result {
            Ok(msg) if msg.is_empty() => {}
            Ok(msg) => self.notify(msg),
            Err(msg) => {
                // keep the box open so the value can be corrected
                self.report(msg);
                return;
            }
        }
        self.cancel_input();
        self.reload();
    }

    fn handle_filter_input(&mut self) {
        let input = self.input_buffer.trim().to_string();
        let parsed = if input.is_empty() { Ok(DateFilter::All) } else { input.parse::<DateFilter>() };
        match parsed {
            Ok(f) => {
                self.set_filter(f);
                self.cancel_input();
            }
            Err(e) => self.report(e),
        }
    }

    /// Submits the login or register form.
    pub fn submit_auth(&mut self) {
        if self.auth_form.is_incomplete() {
            self.notify("Please fill all fields.");
            return;
        }
        let form = &self.auth_form;
        match form.mode {
            AuthMode::Login => match auth::login(&self.store, &form.username, &form.password) {
                Ok(user) => {
                    let greeting = format!("Welcome back, {}!", user.username);
                    self.user = Some(user);
                    self.auth_form = AuthForm::default();
                    self.focus(Screen::Home);
                    self.notify(greeting);
                }
                Err(e) => self.report(e),
            },
            AuthMode::Register => {
                let result = auth::check_confirmation(&form.password, &form.confirm)
                    .and_then(|_| auth::register(&self.store, &form.username, &form.email, &form.password));
                match result {
                    Ok(user) => {
                        self.auth_form = AuthForm {
                            username: user.username,
                            ..AuthForm::default()
                        };
                        self.auth_form.focus = 1;
                        self.notify("Account created! You can now log in.");
                    }
                    Err(e) => self.report(e),
                }
            }
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = auth::logout(&self.store) {
            self.report(e);
            return;
        }
        self.user = None;
        self.focus(Screen::Auth);
        self.notify("Logged out.");
    }
}
