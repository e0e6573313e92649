//! # teamboard - team issue tracker
//!
//! A command-line and terminal UI tracker for a small team: one shared
//! overall issue list plus two kanban boards, one column per group and one
//! column per member.
//!
//! ## Key Features
//!
//! - **Overall list**: issues with what/who/when, severity, status and notes
//! - **Group and member boards**: cards move within and across columns
//! - **Detail editor**: edits are saved back into the collection the task came from
//! - **Local storage**: one JSON blob per collection, rewritten on every change
//! - **Versioned migrations**: stored data is upgraded once, with logged counts
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the TUI
//! tb ui
//!
//! # Add an issue to the overall list
//! tb add overall "Brake squeal" --who Tommy --when "next friday"
//!
//! # Add a card to a group board and move it
//! tb add group Control "Tune PID"
//! tb move --view groups Control-1718000000000 --end Circuit
//!
//! # List a board
//! tb list --view members
//! ```
//!
//! Data is stored in `~/.teamboard/` (override with `--data-dir`), next to an
//! optional `teamboard.toml` listing the group and member columns.

use std::path::PathBuf;

use clap::Parser;

pub mod board;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod fields;
pub mod format;
pub mod list;
pub mod logging;
pub mod migrate;
pub mod persist;
pub mod session;
pub mod state;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod board;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{default_data_dir, Config};
use error::Result;
use logging::{init_logging, LogEcho};
use session::Tracker;
use store::FileStore;

fn main() {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    if let Err(e) = run(cli.command, data_dir) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands, data_dir: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&data_dir)?;
    let config = Config::load(&data_dir)?;

    let echo = match command {
        Commands::Ui => LogEcho::FilesOnly,
        _ => LogEcho::Stderr,
    };
    let _logger = init_logging(&config.log_level, &data_dir.join("logs"), echo)?;

    let store = FileStore::open(&data_dir)?;
    let mut tracker = Tracker::open(store);

    match command {
        Commands::Ui => cmd_ui(tracker, &config),
        Commands::List { view } => cmd_list(&tracker, &config, view),
        Commands::Add { target } => cmd_add(&mut tracker, &config, target),
        Commands::Toggle { view, id } => cmd_toggle(&mut tracker, view, &id),
        Commands::Reorder { active, over, end } => cmd_reorder(&mut tracker, &active, over.as_deref(), end),
        Commands::Move { view, active, before, end } => {
            cmd_move(&mut tracker, &config, view, &active, before.as_deref(), end.as_deref())
        }
        Commands::Delete { view, id } => cmd_delete(&mut tracker, view, &id),
        Commands::Show { view, id } => cmd_show(&tracker, view, &id),
        Commands::Edit { view, id, when, severity, notes, status, what, who, complete } => {
            let args = EditArgs { when, severity, notes, status, what, who, complete };
            cmd_edit(&mut tracker, view, &id, args)
        }
        Commands::Migrate => cmd_migrate(&tracker),
        Commands::Backup => cmd_backup(tracker.store()),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}
