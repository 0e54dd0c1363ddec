//! Bounded-concurrency admission gate.
//!
//! A [`ConcurrencyLimiter`] lets at most `capacity` tasks run at once. Waiters
//! queue in FIFO order on a fair [`Semaphore`]; a slot is an owned permit that
//! is returned when dropped, whether the task succeeded, failed or panicked.
//!
//! One limiter is created per loader call and shared by every file of a
//! directory or every URL of an index, so the bound is global to the call.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;

use crate::error::{LoaderError, LoaderResult};

#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    /// Create a limiter; `max_concurrency` of 0 is treated as 1.
    pub fn new(max_concurrency: usize) -> Self {
        let capacity = max_concurrency.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tasks currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }

    /// Wait for a free slot, then run `task` while holding it.
    pub async fn admit<F, T>(&self, task: F) -> LoaderResult<T>
    where
        F: Future<Output = LoaderResult<T>>,
    {
        let _permit = self.acquire().await?;
        task.await
    }

    /// Wait for a free slot. The slot is released when the permit is dropped.
    pub(crate) async fn acquire(&self) -> LoaderResult<OwnedSemaphorePermit> {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| LoaderError::Concurrency {
                message: format!("limiter closed: {}", e),
            })
    }
}

/// Run `tasks` under `limiter` and collect results in input order.
///
/// Each task is started only after it obtains a slot, in submission order.
/// The first failure is returned as soon as it is observed; tasks still in
/// flight are detached and left to finish on their own.
pub(crate) async fn fan_out<T, Fut>(
    limiter: &ConcurrencyLimiter,
    tasks: Vec<Fut>,
) -> LoaderResult<Vec<T>>
where
    Fut: Future<Output = LoaderResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let mut results: Vec<Option<T>> = Vec::with_capacity(tasks.len());
    results.resize_with(tasks.len(), || None);

    let mut join_set = JoinSet::new();
    let outcome = drive(limiter, tasks, &mut join_set, &mut results).await;
    if outcome.is_err() {
        join_set.detach_all();
    }
    outcome?;

    Ok(results.into_iter().flatten().collect())
}

async fn drive<T, Fut>(
    limiter: &ConcurrencyLimiter,
    tasks: Vec<Fut>,
    join_set: &mut JoinSet<(usize, LoaderResult<T>)>,
    results: &mut [Option<T>],
) -> LoaderResult<()>
where
    Fut: Future<Output = LoaderResult<T>> + Send + 'static,
    T: Send + 'static,
{
    for (index, task) in tasks.into_iter().enumerate() {
        let permit = limiter.acquire().await?;
        join_set.spawn(async move {
            let _permit = permit;
            (index, task.await)
        });

        // Surface failures that finished while we waited for a slot.
        while let Some(joined) = join_set.try_join_next() {
            store(joined, results)?;
        }
    }

    while let Some(joined) = join_set.join_next().await {
        store(joined, results)?;
    }

    Ok(())
}

fn store<T>(
    joined: Result<(usize, LoaderResult<T>), tokio::task::JoinError>,
    results: &mut [Option<T>],
) -> LoaderResult<()> {
    let (index, result) = joined.map_err(|e| LoaderError::Concurrency {
        message: format!("load task failed: {}", e),
    })?;
    results[index] = Some(result?);
    Ok(())
}
