//! Tracker configuration.
//!
//! Read from `teamboard.toml` in the data directory. Every field is optional;
//! a missing file yields the defaults.
//!
//! ```toml
//! groups = ["Mechanical", "Control", "Circuit"]
//! members = ["Bacon", "Maru", "Tommy"]
//! log_level = "info"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::fields::BoardKind;

pub const CONFIG_FILE: &str = "teamboard.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Group board columns, in display order.
    pub groups: Vec<String>,
    /// Member board columns, in display order.
    pub members: Vec<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            groups: ["Mechanical", "Control", "Circuit"]
                .map(String::from)
                .to_vec(),
            members: [
                "Bacon", "Maru", "Deyama", "Tommy", "Shoda", "Narinari", "Asada", "Jaguar", "Daifuku",
            ]
            .map(String::from)
            .to_vec(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load `teamboard.toml` from `data_dir`, or the defaults when absent.
    pub fn load(data_dir: &Path) -> Result<Config> {
        let path = data_dir.join(CONFIG_FILE);
        match fs::read_to_string(&path) {
            Ok(contents) => Config::parse(&contents, &path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(contents: &str, path: &Path) -> Result<Config> {
        let invalid = |details: String| TrackerError::ConfigInvalid {
            path: path.to_path_buf(),
            details,
        };
        let mut config: Config = toml::from_str(contents).map_err(|e| invalid(e.to_string()))?;

        config.log_level = config.log_level.trim().to_ascii_lowercase();
        if config.log_level == "warning" {
            config.log_level = "warn".to_string();
        }
        if !LOG_LEVELS.contains(&config.log_level.as_str()) {
            return Err(invalid(format!(
                "unsupported log level `{}`; expected trace|debug|info|warn|error",
                config.log_level
            )));
        }
        for (field, names) in [("groups", &mut config.groups), ("members", &mut config.members)] {
            for name in names.iter_mut() {
                *name = name.trim().to_string();
            }
            if let Some(empty) = names.iter().position(String::is_empty) {
                return Err(invalid(format!("{field}[{empty}] is empty")));
            }
            let mut seen: Vec<&String> = Vec::new();
            for name in names.iter() {
                if seen.contains(&name) {
                    return Err(invalid(format!("{field} lists '{name}' twice")));
                }
                seen.push(name);
            }
        }
        Ok(config)
    }

    /// Configured column names for one board.
    pub fn columns(&self, kind: BoardKind) -> &[String] {
        match kind {
            BoardKind::Groups => &self.groups,
            BoardKind::Members => &self.members,
        }
    }
}

/// `$HOME/.teamboard`, or `./.teamboard` without a home directory.
pub fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".teamboard")
}
