//! Enumerations and field types shared across the tracker.
//!
//! This module defines the severity scale, the three task collections, the
//! selection source recorded by the detail editor and the view tabs.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Status label given to new tasks in the overall list.
pub const STATUS_NOT_STARTED: &str = "Not started";
/// Status label written by "mark complete" in the detail editor.
pub const STATUS_DONE: &str = "Done";

/// Severity rank of an issue, stored as the numbers 1 to 5.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub enum Severity {
    Low,
    Minor,
    Moderate,
    Major,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Low,
        Severity::Minor,
        Severity::Moderate,
        Severity::Major,
        Severity::Critical,
    ];

    /// Rank used when a task carries no severity.
    pub fn effective(severity: Option<Severity>) -> Severity {
        severity.unwrap_or(Severity::Minor)
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Minor => "Minor",
            Severity::Moderate => "Moderate",
            Severity::Major => "Major",
            Severity::Critical => "Critical",
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> u8 {
        match severity {
            Severity::Low => 1,
            Severity::Minor => 2,
            Severity::Moderate => 3,
            Severity::Major => 4,
            Severity::Critical => 5,
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(rank: u8) -> Result<Self, Self::Error> {
        match rank {
            1 => Ok(Severity::Low),
            2 => Ok(Severity::Minor),
            3 => Ok(Severity::Moderate),
            4 => Ok(Severity::Major),
            5 => Ok(Severity::Critical),
            other => Err(format!("severity must be between 1 and 5, got {other}")),
        }
    }
}

/// The three task stores.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash)]
pub enum Collection {
    Overall,
    Groups,
    Members,
}

impl Collection {
    pub fn display_name(self) -> &'static str {
        match self {
            Collection::Overall => "overall list",
            Collection::Groups => "group boards",
            Collection::Members => "member boards",
        }
    }

    /// Singular noun for one column of a board.
    pub fn column_noun(self) -> &'static str {
        match self {
            Collection::Overall => "list",
            Collection::Groups => "group",
            Collection::Members => "member",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The two keyed boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardKind {
    Groups,
    Members,
}

impl BoardKind {
    pub fn collection(self) -> Collection {
        match self {
            BoardKind::Groups => Collection::Groups,
            BoardKind::Members => Collection::Members,
        }
    }

    pub fn from_collection(collection: Collection) -> Option<BoardKind> {
        match collection {
            Collection::Overall => None,
            Collection::Groups => Some(BoardKind::Groups),
            Collection::Members => Some(BoardKind::Members),
        }
    }

    pub fn source(self, key: &str) -> Source {
        match self {
            BoardKind::Groups => Source::Group(key.to_string()),
            BoardKind::Members => Source::Member(key.to_string()),
        }
    }
}

/// Where the task under edit came from, including its board key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Overall,
    Group(String),
    Member(String),
}

impl Source {
    pub fn collection(&self) -> Collection {
        match self {
            Source::Overall => Collection::Overall,
            Source::Group(_) => Collection::Groups,
            Source::Member(_) => Collection::Members,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Source::Overall => None,
            Source::Group(key) | Source::Member(key) => Some(key),
        }
    }

    /// Tab to return to once the detail editor closes.
    pub fn return_tab(&self) -> ViewTab {
        match self {
            Source::Overall => ViewTab::Overall,
            Source::Group(_) => ViewTab::Groups,
            Source::Member(_) => ViewTab::Members,
        }
    }
}

/// Top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewTab {
    #[default]
    Overall,
    Groups,
    Members,
    Detail,
}

impl ViewTab {
    pub const BROWSABLE: [ViewTab; 3] = [ViewTab::Overall, ViewTab::Groups, ViewTab::Members];

    pub fn title(self) -> &'static str {
        match self {
            ViewTab::Overall => "Overall",
            ViewTab::Groups => "Groups",
            ViewTab::Members => "Members",
            ViewTab::Detail => "Detail",
        }
    }

    pub fn board_kind(self) -> Option<BoardKind> {
        match self {
            ViewTab::Groups => Some(BoardKind::Groups),
            ViewTab::Members => Some(BoardKind::Members),
            ViewTab::Overall | ViewTab::Detail => None,
        }
    }
}
