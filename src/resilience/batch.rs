//! Bounded-concurrency batch execution.

use futures_util::future::join_all;
use std::future::Future;
use std::time::Duration;

/// Chunk size used when callers have no preference.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Pause between chunks so other pending work gets scheduled.
const YIELD_BETWEEN_BATCHES: Duration = Duration::from_millis(10);

/// Run `handler` over `items` in consecutive chunks of `batch_size`.
///
/// Handlers within a chunk run concurrently; chunk k+1 starts only after
/// chunk k has fully resolved. Results keep the input order.
pub async fn batch_process<I, T, F, Fut>(items: Vec<I>, handler: F, batch_size: usize) -> Vec<T>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = T>,
{
    let batch_size = batch_size.max(1);
    let mut results = Vec::with_capacity(items.len());
    let mut remaining = items.into_iter().peekable();
    let mut batch = 0usize;

    while remaining.peek().is_some() {
        if batch > 0 {
            tokio::time::sleep(YIELD_BETWEEN_BATCHES).await;
        }
        let chunk: Vec<I> = remaining.by_ref().take(batch_size).collect();
        tracing::trace!(batch, size = chunk.len(), "Processing batch");
        results.extend(join_all(chunk.into_iter().map(&handler)).await);
        batch += 1;
    }

    results
}

/// Fallible variant of [`batch_process`].
///
/// The chunk containing the first failure still runs to completion; later
/// chunks are not started and the earliest error (by input order) is returned.
pub async fn try_batch_process<I, T, E, F, Fut>(
    items: Vec<I>,
    handler: F,
    batch_size: usize,
) -> Result<Vec<T>, E>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let batch_size = batch_size.max(1);
    let mut results = Vec::with_capacity(items.len());
    let mut remaining = items.into_iter().peekable();
    let mut first = true;

    while remaining.peek().is_some() {
        if !first {
            tokio::time::sleep(YIELD_BETWEEN_BATCHES).await;
        }
        first = false;
        let chunk: Vec<I> = remaining.by_ref().take(batch_size).collect();
        for outcome in join_all(chunk.into_iter().map(&handler)).await {
            results.push(outcome?);
        }
    }

    Ok(results)
}
