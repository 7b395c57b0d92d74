//! Error types for waymark-geofence
//!
//! These errors come back from the collaborator traits (OS geofencing, event
//! store, notifications). The registrar and the entry handler never surface
//! them to their callers; they log them and record an outcome instead.

use thiserror::Error;

/// Result type for waymark-geofence operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the geofence boundaries
#[derive(Debug, Error)]
pub enum Error {
    /// OS start/stop monitoring call failed
    #[error("geofence registration failed: {0}")]
    Registration(String),

    /// A boundary call did not finish in time
    #[error("{operation} timed out after {millis}ms")]
    Timeout {
        /// Name of the boundary call
        operation: &'static str,
        /// Configured limit
        millis: u64,
    },

    /// Event store read failed
    #[error("event fetch failed: {0}")]
    EventFetch(String),

    /// Event does not exist in the store
    #[error("event {0:?} not found")]
    EventNotFound(String),

    /// Notification could not be presented
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),

    /// Configuration could not be parsed
    #[error("config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Compile-time check that Error is Send + Sync for use across tasks.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
