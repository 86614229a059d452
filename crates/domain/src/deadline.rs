//! Per-call deadlines for repository round trips.
//!
//! Services await every repository future through [`within`]. Dropping the
//! returned future cancels the in-flight call as well.

use std::future::Future;
use std::time::Duration;

use crate::DomainError;

/// Await `fut`, giving up with [`DomainError::DeadlineExceeded`] once
/// `timeout` elapses. `None` waits indefinitely.
pub async fn within<T, F>(timeout: Option<Duration>, fut: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DomainError::DeadlineExceeded(limit))?,
        None => fut.await,
    }
}
