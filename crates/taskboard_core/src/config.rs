//! Runtime configuration defaults.
//!
//! # Responsibility
//! - Resolve where the database file and rolling logs live by default.
//! - Pick the default log level for the current build mode.
//!
//! Callers (the CLI) override individual fields from flags or environment.

use crate::logging::default_log_level;
use directories::ProjectDirs;
use std::path::PathBuf;

const DB_FILE_NAME: &str = "taskboard.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Paths and levels needed to start a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Defaults under the platform data directory.
    ///
    /// Falls back to `./.taskboard` when no home directory can be resolved.
    pub fn from_platform_dirs() -> Self {
        match ProjectDirs::from("dev", "taskboard", "taskboard") {
            Some(dirs) => Self::rooted_at(dirs.data_dir().to_path_buf()),
            None => Self::rooted_at(std::env::current_dir().unwrap_or_default().join(".taskboard")),
        }
    }

    /// Defaults rooted at `data_dir`.
    pub fn rooted_at(data_dir: PathBuf) -> Self {
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_dir: data_dir.join(LOG_DIR_NAME),
            log_level: default_log_level().to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_platform_dirs()
    }
}
