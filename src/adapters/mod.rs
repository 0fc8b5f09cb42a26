//! Adapters layer: Concrete implementations of ports.
//!
//! - `sqlite`: SQLite for local storage
//! - `memory`: process-local storage for tests and `:memory:` runs
//! - `sanitize`: PII filtering for logs

pub mod memory;
pub mod sanitize;
pub mod sqlite;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Assessment already exists: {0}")]
    Duplicate(String),

    #[error("Storage lock poisoned")]
    Lock,
}
