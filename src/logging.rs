//! Logging bootstrap.
//!
//! Log lines go to rolling files under `<data-dir>/logs`. The CLI also copies
//! warnings and errors to stderr; the TUI does not, since it owns the terminal.
//! Messages use `event=<name> key=value` pairs.

use std::path::Path;

use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;

use crate::error::{Result, TrackerError};

const LOG_FILE_BASENAME: &str = "teamboard";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Where log output is mirrored besides the log files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEcho {
    /// Warnings and errors also go to stderr.
    Stderr,
    /// Files only.
    FilesOnly,
}

/// Start file logging. Keep the returned handle alive for the program's run.
pub fn init_logging(level: &str, log_dir: &Path, echo: LogEcho) -> Result<LoggerHandle> {
    std::fs::create_dir_all(log_dir)?;

    let duplicate = match echo {
        LogEcho::Stderr => Duplicate::Warn,
        LogEcho::FilesOnly => Duplicate::None,
    };

    let handle = Logger::try_with_str(level)
        .map_err(|e| TrackerError::Logger(format!("invalid log level `{level}`: {e}")))?
        .log_to_file(FileSpec::default().directory(log_dir).basename(LOG_FILE_BASENAME))
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .duplicate_to_stderr(duplicate)
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|e| TrackerError::Logger(e.to_string()))?;

    info!(
        "event=app_start version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir.display()
    );
    Ok(handle)
}
