//! Error types for trigger cache operations.

use thiserror::Error;

/// Errors that can occur during trigger cache operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Native DB error.
    #[error("Database error: {0}")]
    Database(String),

    /// The database file is held by another handle.
    #[error("Trigger cache is locked by another handle")]
    Locked,

    /// Stored payload could not be decoded.
    #[error("Corrupt trigger cache: {0}")]
    Corrupt(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for trigger cache operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        match err {
            native_db::db_type::Error::RedbDatabaseError(
                redb::DatabaseError::DatabaseAlreadyOpen,
            ) => Error::Locked,
            // native_db's own messages omit the underlying redb error
            other => match std::error::Error::source(&other) {
                Some(source) => Error::Database(format!("{other}: {source}")),
                None => Error::Database(other.to_string()),
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
