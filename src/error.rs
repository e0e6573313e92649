//! Error type shared by the storage, configuration and command layers.
//!
//! Domain mutations never fail: an unresolved id leaves state unchanged and
//! the operation reports `false`. Errors are reserved for I/O, parsing and
//! invalid command-line input.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration in {path:?}: {details}")]
    ConfigInvalid { path: PathBuf, details: String },

    #[error("Logger setup failed: {0}")]
    Logger(String),

    #[error("No task with id '{id}' in {collection}")]
    TaskNotFound { id: String, collection: String },

    #[error("Unknown {kind} '{name}'")]
    UnknownColumn { kind: String, name: String },

    #[error("Invalid due date '{0}'. Use YYYY-MM-DD, 'today', 'tomorrow', 'in 3d', 'next friday'.")]
    InvalidDue(String),

    #[error("{0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
