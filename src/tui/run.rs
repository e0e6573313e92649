//! TUI entry point and terminal setup.

use std::io;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::config::Config;
use crate::error::Result;
use crate::session::Tracker;
use crate::store::FileStore;
use crate::tui::app::App;

/// Take over the terminal and run the tracker UI until the user quits.
pub fn run_tui(tracker: Tracker<FileStore>, config: &Config) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("event=tui_start");
    let mut app = App::new(tracker, config.clone());
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("event=tui_exit");

    result?;
    Ok(())
}
