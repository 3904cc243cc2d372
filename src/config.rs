//! Runtime configuration read from the environment at startup.

use std::path::PathBuf;

pub const MODEL_PATH_ENV: &str = "GASTRIC_RFS_MODEL_PATH";
pub const LOG_MODE_ENV: &str = "GASTRIC_RFS_LOG_MODE";
pub const LOG_FILE_ENV: &str = "GASTRIC_RFS_LOG_FILE";

const DEFAULT_MODEL_PATH: &str = "models";
const DEFAULT_LOG_FILE: &str = "gastric_rfs.log";

/// Where log output goes.
///
/// Writing logs to the terminal corrupts the TUI's alternate screen, so an
/// interactive session logs to a file unless told otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    File,
    Stdout,
    #[default]
    Auto,
}

impl LogMode {
    /// Parse a mode name; anything unrecognised falls back to `Auto`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Artifact directory (or its `manifest.json`)
    pub model_path: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            model_path: get(MODEL_PATH_ENV).map_or(defaults.model_path, PathBuf::from),
            log_mode: get(LOG_MODE_ENV).map_or(defaults.log_mode, |v| LogMode::parse(&v)),
            log_file: get(LOG_FILE_ENV).map_or(defaults.log_file, PathBuf::from),
        }
    }
}
