//! Bounded worker pool
//!
//! Runs one async operation per item with a hard ceiling on how many are in
//! flight at once. A permit is acquired before each task is spawned and is
//! held by the task until its operation finishes, whether it succeeds,
//! fails, or panics. Every item is attempted; successes and failures are
//! collected into a `PoolOutcome` once all tasks have settled.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Aggregated result of one pool run
#[derive(Debug)]
pub struct PoolOutcome<T, E> {
    /// Values of operations that returned `Ok`, in completion order
    pub results: Vec<T>,
    /// Errors of operations that returned `Err`, in completion order
    pub failures: Vec<E>,
    /// Tasks that panicked or were cancelled
    pub panicked: usize,
}

impl<T, E> Default for PoolOutcome<T, E> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            failures: Vec::new(),
            panicked: 0,
        }
    }
}

impl<T, E> PoolOutcome<T, E> {
    /// Number of tasks that ran to completion, successfully or not
    pub fn settled(&self) -> usize {
        self.results.len() + self.failures.len() + self.panicked
    }
}

/// Fixed-size pool of concurrent operations
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl WorkerPool {
    /// Creates a pool allowing at most `limit` operations in flight (minimum 1)
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Operations currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.limit - self.semaphore.available_permits()
    }

    /// Runs `op` once per item and waits for all of them to settle
    ///
    /// A failing or panicking item never cancels its siblings.
    pub async fn run<I, F, Fut, T, E>(&self, items: I, op: F) -> PoolOutcome<T, E>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let op = Arc::new(op);
        let mut tasks = JoinSet::new();

        for item in items {
            let Ok(permit) = Arc::clone(&self.semaphore).acquire_owned().await else {
                tracing::error!("Worker pool semaphore closed, not dispatching remaining items");
                break;
            };

            let op = Arc::clone(&op);
            tasks.spawn(async move {
                let _permit = permit;
                op(item).await
            });
        }

        let mut outcome = PoolOutcome::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(value)) => outcome.results.push(value),
                Ok(Err(error)) => outcome.failures.push(error),
                Err(e) => {
                    tracing::error!(error = %e, "Worker task did not complete");
                    outcome.panicked += 1;
                }
            }
        }

        outcome
    }
}
