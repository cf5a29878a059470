//! Storage error types.

use thiserror::Error;

/// Errors that can occur when reading or writing durable storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read or write a file.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored JSON could not be encoded or decoded.
    #[error("invalid JSON in storage: {0}")]
    Json(#[from] serde_json::Error),

    /// A SQLite operation failed.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Stored content parsed but violates the registry's rules.
    #[error("corrupt storage: {0}")]
    Corrupt(String),

    /// Another thread panicked while holding the store lock.
    #[error("storage lock poisoned")]
    LockPoisoned,
}
