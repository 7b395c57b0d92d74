//! Error types for waymark-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed trigger identifier: {0:?}")]
    MalformedIdentifier(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
