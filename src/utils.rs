use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{ AppError, Result };

/// Run `fut` with a deadline; expiry becomes a recoverable `AppError::Timeout`.
pub async fn with_timeout<T, F>(limit: Duration, what: &str, fut: F) -> Result<T>
    where F: Future<Output = Result<T>>
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!("{} after {:?}", what, limit))),
    }
}

/// Spawn one task per item, at most `limit` running at once, and wait for all.
///
/// Outputs come back in completion order. A panicking task is logged and
/// dropped from the results.
pub async fn for_each_bounded<T, F, Fut>(items: Vec<T>, limit: usize, f: F) -> Vec<Fut::Output>
    where
        T: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut tasks = JoinSet::new();

    for item in items {
        let semaphore = semaphore.clone();
        let fut = f(item);
        tasks.spawn(async move {
            // The semaphore is never closed, so acquire only fails if that changes
            let _permit = semaphore.acquire_owned().await.ok();
            fut.await
        });
    }

    let mut outputs = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(output) => outputs.push(output),
            Err(e) => tracing::error!(error = %e, "bounded task failed to join"),
        }
    }
    outputs
}
