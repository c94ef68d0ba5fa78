//! # Remindust
//!
//! A terminal task list that reminds you when a task's time comes. Tasks live
//! on a small REST backend; `remindust` keeps a local copy in sync and rings
//! once when an open task reaches its reminder time.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! remindust
//! # or explicitly
//! remindust ui
//! ```
//!
//! #### TUI Key Bindings
//!
//! *   `q`: Quit
//! *   `a`: Add new task (description, then optional HH:MM reminder)
//! *   `Space`: Toggle done
//! *   `d`: Delete selected task
//! *   `c`: Show/hide completed tasks
//! *   `s`: Push the whole list to the backend
//! *   `x`: Dismiss the oldest reminder
//! *   `z`: Keep the oldest reminder on screen
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! remindust add "Call Alice" --at 14:30
//! remindust list --all
//! remindust toggle 3
//! remindust remove 3
//! remindust watch          # headless reminders on stdout
//! remindust serve          # reference backend on 127.0.0.1:4000
//! ```
//!
//! ## Configuration
//!
//! `~/.config/remindust/config.toml` (or `REMINDUST_CONFIG`):
//!
//! ```toml
//! [backend]
//! url = "http://localhost:4000"
//!
//! [sync]
//! mirror_snapshots = false
//!
//! [alerts]
//! notifications = true
//! sound = true
//! ```
//!
//! `REMINDUST_BACKEND` or `--backend` override the URL. The reference backend
//! stores its list in `~/.local/share/remindust/todos.json` unless
//! `REMINDUST_DB` says otherwise.

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use remindust::backend::{self, storage, BackendState};
use remindust::client::BackendClient;
use remindust::commands::*;
use remindust::config::Config;
use remindust::models::TaskId;
use remindust::{logging, tui, watch};

#[derive(Parser)]
#[command(name = "remindust", version)]
#[command(about = "Terminal task list with clock-time reminders", long_about = None)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Backend URL (overrides config)
    #[arg(long, global = true)]
    backend: Option<String>,
    /// More logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Less logging (-q, -qq)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    quiet: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task description (quoted if it has spaces)
        description: String,
        /// Reminder time today, HH:MM
        #[arg(short, long)]
        at: Option<String>,
    },
    /// List tasks
    List {
        /// Show completed tasks
        #[arg(short, long)]
        all: bool,
    },
    /// Toggle a task between open and complete
    Toggle {
        id: TaskId,
    },
    /// Remove a task
    Remove {
        id: TaskId,
    },
    /// Print reminders as they come due, without the TUI
    Watch,
    /// Run the reference task backend
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:4000")]
        addr: String,
        /// JSON file holding the tasks
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _log_guard = match cli.command {
        Some(Commands::Ui) | None => Some(logging::init_file(cli.verbose, cli.quiet)?),
        _ => {
            logging::init_stderr(cli.verbose, cli.quiet)?;
            None
        }
    };

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.backend {
        config.backend.url = url;
    }

    match cli.command {
        Some(Commands::Add { description, at }) => {
            let client = BackendClient::new(&config.backend.url)?;
            cmd_add(&client, description, at, false).await
        }
        Some(Commands::List { all }) => {
            let client = BackendClient::new(&config.backend.url)?;
            cmd_list(&client, all).await
        }
        Some(Commands::Toggle { id }) => {
            let client = BackendClient::new(&config.backend.url)?;
            cmd_toggle(&client, id, false).await
        }
        Some(Commands::Remove { id }) => {
            let client = BackendClient::new(&config.backend.url)?;
            cmd_remove(&client, id, false).await
        }
        Some(Commands::Watch) => watch::run_watch(&config).await,
        Some(Commands::Serve { addr, db }) => {
            let state = BackendState::open(db.unwrap_or_else(storage::db_path));
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            backend::serve(listener, state).await?;
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => anyhow::bail!("Unsupported shell: {}", shell),
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "remindust", &mut io::stdout());
            Ok(())
        }
        Some(Commands::Ui) | None => tui::run_tui(&config).await,
    }
}
