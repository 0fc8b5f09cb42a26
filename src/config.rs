//! Runtime configuration from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `THYRORISK_DB_PATH` | `thyrorisk.db` (`:memory:` for a throwaway store) |
//! | `THYRORISK_LOG_MODE` | `auto` (`file`, `stdout`, `stderr`) |
//! | `THYRORISK_LOG_FILE` | `thyrorisk.log` |
//! | `THYRORISK_SANITIZE_MAX_BYTES` | `16384` (bytes sanitized per log line) |
//!
//! Log filtering itself is controlled by `RUST_LOG`.

use std::path::PathBuf;

use crate::adapters::sanitize::DEFAULT_SANITIZE_MAX_BYTES;

pub const DB_PATH_ENV: &str = "THYRORISK_DB_PATH";
pub const LOG_MODE_ENV: &str = "THYRORISK_LOG_MODE";
pub const LOG_FILE_ENV: &str = "THYRORISK_LOG_FILE";
pub const SANITIZE_MAX_BYTES_ENV: &str = "THYRORISK_SANITIZE_MAX_BYTES";

const DEFAULT_DB_PATH: &str = "thyrorisk.db";
const DEFAULT_LOG_FILE: &str = "thyrorisk.log";
const MEMORY_DB: &str = ":memory:";

/// Where assessments are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    Memory,
    File(PathBuf),
}

impl StorageLocation {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value == MEMORY_DB {
            Self::Memory
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

/// Log destination. Reports are printed on stdout, so `auto` logs to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    File,
    Stdout,
    Stderr,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            "auto" | "stderr" => Self::Stderr,
            // Unrecognised modes.
            _ => Self::Stderr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub storage: StorageLocation,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub sanitize_max_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageLocation::File(PathBuf::from(DEFAULT_DB_PATH)),
            log_mode: LogMode::Stderr,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            sanitize_max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
        }
    }
}

impl Config {
    /// Read configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            storage: non_empty(DB_PATH_ENV)
                .map(|v| StorageLocation::parse(&v))
                .unwrap_or(defaults.storage),
            log_mode: non_empty(LOG_MODE_ENV)
                .map(|v| LogMode::parse(&v))
                .unwrap_or(defaults.log_mode),
            log_file: non_empty(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            // Zero or unparsable caps keep the default.
            sanitize_max_bytes: non_empty(SANITIZE_MAX_BYTES_ENV)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&v| v > 0)
                .unwrap_or(defaults.sanitize_max_bytes),
        }
    }

    /// Override the storage location (e.g. from a CLI flag).
    #[must_use]
    pub fn with_storage(mut self, storage: StorageLocation) -> Self {
        self.storage = storage;
        self
    }
}
