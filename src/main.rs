//! # studyplan
//!
//! A terminal study planner. Create tagged tasks with deadlines, see them by
//! day or by deadline category, tick them off, and keep an eye on what is
//! overdue. A fast CLI for scripting sits next to an interactive TUI.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! Run without arguments to launch the interactive UI:
//!
//! ```bash
//! studyplan
//! # or explicitly
//! studyplan ui
//! ```
//!
//! The TUI opens on the login form when nobody is logged in. After login,
//! `Tab` (or `1`-`4`) moves between Home, Schedule, Notifications and
//! Profile. `Enter` opens a task's details, `Space` toggles it done, `d`
//! deletes it after confirmation, `a` adds a task.
//!
//! ### Command Line Interface (CLI)
//!
//! **Accounts**
//! ```bash
//! studyplan register alice --email alice@example.com --password hunter22
//! studyplan login alice --password hunter22
//! studyplan whoami
//! studyplan profile --username alicia
//! studyplan logout
//! ```
//!
//! **Tasks**
//! ```bash
//! studyplan add "Physics Lab Report" --tag Project --due 2025-12-01 --notes "Include graphs"
//! studyplan list --date 2025-12-01
//! studyplan schedule
//! studyplan overdue
//! studyplan toggle <ID>
//! studyplan edit <ID> --due 2025-12-03
//! studyplan delete <ID>
//! ```
//!
//! ## Data Storage
//!
//! Everything lives in one JSON key-value file in your local data directory:
//! *   Linux: `~/.local/share/studyplan/store.json`
//! *   macOS: `~/Library/Application Support/studyplan/store.json`
//! *   Windows: `%APPDATA%\studyplan\store.json`
//!
//! Override it with `--store` or the `STUDYPLAN_STORE` environment variable.
//! Set `RUST_LOG` (or pass `-v`) for diagnostics on stderr.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use studyplan::commands::*;
use studyplan::models::ProfileUpdate;
use studyplan::tui::run_tui;
use studyplan::views::DateFilter;
use studyplan::{Config, Store};

#[derive(Parser)]
#[command(name = "studyplan", version)]
#[command(about = "Study planner for tagged tasks with deadlines", long_about = None)]
struct Cli {
    /// Path of the store file
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Less log output (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        username: String,
        #[arg(short, long, default_value = "")]
        email: String,
        #[arg(short, long, env = "STUDYPLAN_PASSWORD", hide_env_values = true)]
        password: String,
        /// Repeat the password
        #[arg(short, long)]
        confirm: Option<String>,
    },
    /// Log in as an existing user
    Login {
        username: String,
        #[arg(short, long, env = "STUDYPLAN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show or edit the logged-in user's profile
    Profile {
        /// New username
        #[arg(short, long)]
        username: Option<String>,
        /// New email
        #[arg(short, long)]
        email: Option<String>,
        /// New password
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Homework, Exam, Project or any other label
        #[arg(short, long)]
        tag: String,
        /// Deadline in YYYY-MM-DD
        #[arg(short, long)]
        due: String,
        /// Free-text notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List tasks, pending first then by deadline
    List {
        /// Only tasks due on this date (YYYY-MM-DD), or "all"
        #[arg(short, long, default_value = "all")]
        date: DateFilter,
        /// Only tasks with this tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Include completed tasks
        #[arg(short, long)]
        all: bool,
    },
    /// Show tasks grouped into overdue, today, upcoming and completed
    Schedule {
        /// Only tasks due on this date (YYYY-MM-DD), or "all"
        #[arg(short, long, default_value = "all")]
        date: DateFilter,
    },
    /// Show overdue tasks
    Overdue,
    /// Show pending, overdue and completed counts
    Summary,
    /// Show one task in full
    Show {
        id: String,
    },
    /// Toggle a task between pending and done
    Toggle {
        id: String,
    },
    /// Edit a task
    Edit {
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New notes
        #[arg(short, long)]
        notes: Option<String>,
        /// New tag
        #[arg(short, long)]
        tag: Option<String>,
        /// New deadline
        #[arg(short, long)]
        due: Option<String>,
    },
    /// Delete a task
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Reset the store (delete all tasks and accounts)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::resolve(cli.store.as_deref());
    let store = Store::from_config(&config);

    match cli.command {
        Some(Commands::Register { username, email, password, confirm }) => {
            cmd_register(&store, &username, &email, &password, confirm.as_deref())
        }
        Some(Commands::Login { username, password }) => cmd_login(&store, &username, &password),
        Some(Commands::Logout) => cmd_logout(&store),
        Some(Commands::Whoami) => cmd_whoami(&store),
        Some(Commands::Profile { username, email, password }) => {
            cmd_profile(&store, ProfileUpdate { username, email, password })
        }
        Some(Commands::Add { title, tag, due, notes }) => cmd_add(&store, title, tag, due, notes),
        Some(Commands::List { date, tag, all }) => cmd_list(&store, date, tag, all),
        Some(Commands::Schedule { date }) => cmd_schedule(&store, date),
        Some(Commands::Overdue) => cmd_overdue(&store),
        Some(Commands::Summary) => cmd_summary(&store),
        Some(Commands::Show { id }) => cmd_show(&store, &id),
        Some(Commands::Toggle { id }) => cmd_toggle(&store, &id),
        Some(Commands::Edit { id, title, notes, tag, due }) => cmd_edit(&store, &id, title, notes, tag, due),
        Some(Commands::Delete { id, force }) => cmd_delete(&store, &id, force),
        Some(Commands::Reset { force }) => cmd_reset(&store, force),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "studyplan", &mut io::stdout());
            Ok(())
        }
        Some(Commands::Ui) | None => run_tui(store).map_err(|e| anyhow!("error running TUI: {e}")),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.verbose, cli.quiet) {
        eprintln!("Error: {e:#}");
        std::process::exit(2);
    }
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
