use crate::pipeline::{error::Result, telemetry::Progress};
use keyforge::{GeneratedItem, KeyGenerator};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Worker task that generates keypairs and submits them to the shared queue.
///
/// The loop checks `stop` once per iteration, before generating. Once an item
/// has been generated it is always submitted: a full queue suspends the worker
/// until the aggregator makes room, and a stop request arriving in the
/// meantime takes effect only after the item is delivered.
///
/// # Arguments
///
/// - `worker_id`: Numeric identifier for this worker (used for logs).
/// - `generator`: Shared [`KeyGenerator`].
/// - `queue`: Sender half of the bounded queue drained by the aggregator.
/// - `stop`: Token cancelled on scale-down or shutdown.
/// - `progress`: Counters updated once per accepted item.
///
/// # Errors
///
/// Returns [`Error::Generation`](crate::pipeline::error::Error::Generation) if
/// the generator fails. A closed queue is not an error: it means the consumer
/// has already gone away and reported its own failure.
pub async fn worker_loop<G>(
    worker_id: usize,
    generator: Arc<G>,
    queue: mpsc::Sender<GeneratedItem>,
    stop: CancellationToken,
    progress: Arc<Progress>,
) -> Result<()>
where
    G: KeyGenerator,
{
    tracing::trace!("Worker {worker_id} started");

    while !stop.is_cancelled() {
        let item = generator.try_generate()?;

        if queue.send(item).await.is_err() {
            tracing::debug!("Worker {worker_id} found the queue closed");
            break;
        }
        progress.record_produced();
    }

    tracing::trace!("Worker {worker_id} stopped");
    Ok(())
}
