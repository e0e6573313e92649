use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Team issue tracker: an overall list plus group and member kanban boards.
/// Data lives in ~/.teamboard unless --data-dir says otherwise.
#[derive(Parser)]
#[command(name = "tb", version, about = "Team issue tracker with kanban boards")]
pub struct Cli {
    /// Directory holding the task blobs, config and logs.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
