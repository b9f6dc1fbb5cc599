pub mod app;
pub mod ui;

use std::{error::Error, io};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use app::{App, InputField, InputMode, Screen};
use ui::ui;

use crate::storage::Store;

pub fn run_tui(store: Store) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key(app, key);
            }
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

/// Routes one key press to the focused screen.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        InputMode::Confirming => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.confirm_delete(false),
            _ => {}
        },
        InputMode::Editing | InputMode::Adding | InputMode::Filtering => match key.code {
            KeyCode::Enter => app.handle_input(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Char(c) => app.input_buffer.push(c),
            KeyCode::Backspace => {
                app.input_buffer.pop();
            }
            _ => {}
        },
        InputMode::Normal if app.screen == Screen::Auth => match key.code {
            KeyCode::Esc => app.should_quit = true,
            KeyCode::Enter => app.submit_auth(),
            KeyCode::Tab | KeyCode::Down => app.auth_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => app.auth_form.previous_field(),
            KeyCode::Left | KeyCode::Right => app.auth_form.switch_mode(),
            KeyCode::Char(c) => app.auth_form.push(c),
            KeyCode::Backspace => app.auth_form.pop(),
            _ => {}
        },
        InputMode::Normal if app.detail_id.is_some() => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => app.close_detail(),
            KeyCode::Char(' ') => app.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
            KeyCode::Char('n') => app.start_edit(InputField::Title),
            KeyCode::Char('o') => app.start_edit(InputField::Notes),
            KeyCode::Char('g') => app.start_edit(InputField::Tag),
            KeyCode::Char('t') => app.start_edit(InputField::Deadline), // 't' for Time/Date
            _ => {}
        },
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Tab => app.next_tab(),
            KeyCode::BackTab => app.previous_tab(),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                app.focus(Screen::TABS[idx]);
            }
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Char(' ') => app.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
            KeyCode::Enter => app.open_detail(),
            KeyCode::Char('a') => app.start_add(),
            KeyCode::Char('f') => app.start_filter(),
            KeyCode::Char('x') => app.set_filter(crate::views::DateFilter::All),
            KeyCode::Char('[') => app.shift_filter(-1),
            KeyCode::Char(']') => app.shift_filter(1),
            KeyCode::Char('.') => app.shift_filter_to_today(),
            KeyCode::Char('r') => app.reload(),
            KeyCode::Char('u') => app.start_edit(InputField::Username),
            KeyCode::Char('e') => app.start_edit(InputField::Email),
            KeyCode::Char('p') => app.start_edit(InputField::Password),
            KeyCode::Char('o') if app.screen == Screen::Profile => app.logout(),
            _ => {}
        },
    }
}
