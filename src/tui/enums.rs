//! Enumerations for TUI state management.

use crate::fields::Source;
use crate::task::{Task, TaskId};

/// Which screen receives key presses.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    Browse,
    AddTask,
    Confirm,
}

/// Group board view mode: every card, or only the completed ones.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum BoardMode {
    #[default]
    Active,
    Completed,
}

impl BoardMode {
    pub fn toggled(self) -> Self {
        match self {
            BoardMode::Active => BoardMode::Completed,
            BoardMode::Completed => BoardMode::Active,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BoardMode::Active => "active",
            BoardMode::Completed => "completed",
        }
    }
}

/// Which cards a board column shows, and in what order.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum CardFilter {
    /// Every card in stored order.
    All,
    /// Every card, open ones first, each part in stored order.
    OpenFirst,
    Done,
}

impl CardFilter {
    pub fn shows(self, task: &Task) -> bool {
        match self {
            CardFilter::All | CardFilter::OpenFirst => true,
            CardFilter::Done => task.completed,
        }
    }
}

impl From<BoardMode> for CardFilter {
    fn from(mode: BoardMode) -> Self {
        match mode {
            BoardMode::Active => CardFilter::All,
            BoardMode::Completed => CardFilter::Done,
        }
    }
}

/// A card picked up with Space, waiting to be dropped.
#[derive(Clone, PartialEq, Debug)]
pub struct Grab {
    pub id: TaskId,
    pub source: Source,
}

/// A delete waiting for y/n.
#[derive(Clone, PartialEq, Debug)]
pub struct PendingDelete {
    pub id: TaskId,
    pub source: Source,
    pub label: String,
}
