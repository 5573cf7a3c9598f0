// Bounded fan-out of per-container tasks with a per-task deadline

use crate::error::CollectError;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOutLimits {
    /// Max tasks of one stage talking to the runtime at the same time.
    pub max_concurrency: usize,
    /// Deadline per task, counted from when it gets a permit.
    pub task_timeout: Duration,
}

/// Spawns one task per key and waits for all of them.
///
/// Failed, timed-out and panicked tasks are logged and left out of the result;
/// they never affect their siblings. A timed-out task's future is dropped,
/// which cancels the underlying runtime call.
pub(crate) async fn fan_out<K, T, F, Fut>(
    stage: &'static str,
    keys: Vec<K>,
    limits: FanOutLimits,
    task: F,
) -> Vec<(K, T)>
where
    K: Debug + Send + 'static,
    T: Send + 'static,
    F: Fn(&K) -> Fut,
    Fut: Future<Output = Result<T, CollectError>> + Send + 'static,
{
    let permits = Arc::new(Semaphore::new(limits.max_concurrency.max(1)));
    let deadline = limits.task_timeout;
    let mut set = JoinSet::new();
    let expected = keys.len();

    for key in keys {
        let fut = task(&key);
        let permits = permits.clone();
        set.spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            let result = match tokio::time::timeout(deadline, fut).await {
                Ok(r) => r,
                Err(_) => Err(CollectError::Timeout(deadline)),
            };
            (key, result)
        });
    }

    let mut out = Vec::with_capacity(expected);
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((key, Ok(value))) => out.push((key, value)),
            Ok((key, Err(e))) => {
                tracing::warn!(stage, key = ?key, error = %e, "container query failed");
            }
            Err(e) => {
                tracing::warn!(stage, error = %e, "collection task did not complete");
            }
        }
    }
    tracing::debug!(stage, expected, succeeded = out.len(), "stage finished");
    out
}
