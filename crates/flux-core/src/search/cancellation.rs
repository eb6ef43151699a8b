//! Cancellation helpers shared by remote backends.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{Result, SearchError};

/// Drives `operation` until it completes or `cancel` fires.
///
/// An already-cancelled token settles immediately with
/// [`SearchError::Cancelled`] and the operation is never polled, so no
/// request leaves the process. Cancelling later drops the in-flight future.
pub async fn run_cancellable<T, F>(cancel: &CancellationToken, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(SearchError::Cancelled);
    }

    tokio::select! {
        biased; // Check cancellation first
        _ = cancel.cancelled() => Err(SearchError::Cancelled),
        result = operation => result,
    }
}
