//! Persistence worker draining the click queue.

use metrics::counter;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, trace};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;

/// Receiving half of the click queue, shared by every worker.
///
/// The mutex serializes hand-off: only the worker holding the lock can
/// dequeue, so an event is never delivered twice.
pub type SharedClickQueue = Arc<Mutex<mpsc::Receiver<ClickEvent>>>;

/// Runs one click worker until the queue is closed and empty.
///
/// Events already queued when the sender is dropped are still delivered, so
/// closing the queue starts the drain. The caller bounds how long it may take.
///
/// Store failures are logged and the event is discarded.
pub async fn run_click_worker<C>(worker_id: usize, queue: SharedClickQueue, repository: Arc<C>)
where
    C: ClickRepository + ?Sized,
{
    debug!(worker_id, "Click worker started");

    loop {
        let next = queue.lock().await.recv().await;

        let Some(event) = next else {
            break;
        };

        persist(worker_id, repository.as_ref(), event).await;
    }

    debug!(worker_id, "Click worker stopped");
}

async fn persist<C>(worker_id: usize, repository: &C, event: ClickEvent)
where
    C: ClickRepository + ?Sized,
{
    let link_id = event.link_id;

    match repository.record_click(event.into_new_click()).await {
        Ok(click) => {
            counter!("clicks_persisted_total").increment(1);
            trace!(worker_id, link_id, click_id = click.id, "Click persisted");
        }
        Err(e) => {
            counter!("clicks_failed_total").increment(1);
            error!(worker_id, link_id, error = %e, "Failed to persist click, discarding event");
        }
    }
}
