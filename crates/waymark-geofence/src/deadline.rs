//! Bounded boundary calls

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Run a boundary call with a time limit
///
/// An elapsed limit becomes [`Error::Timeout`], so callers handle it like any
/// other failure of that call.
pub(crate) async fn bounded<T, F>(operation: &'static str, limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            operation,
            millis: limit.as_millis() as u64,
        }),
    }
}
