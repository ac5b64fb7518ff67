//! Bounded click ingestion pipeline.
//!
//! Redirect handlers submit [`ClickEvent`]s without ever waiting: when the
//! queue is full the event is dropped and counted. A fixed pool of workers
//! drains the queue into the click store.
//!
//! # Shutdown
//!
//! [`ClickPipeline::shutdown`] closes the queue, lets workers drain it for a
//! bounded grace period and then aborts them. Events still queued when the
//! grace period ends are lost.

use metrics::counter;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::click_worker::{SharedClickQueue, run_click_worker};
use crate::domain::repositories::ClickRepository;

/// Sizing of the click pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum number of queued events. Values below 1 are raised to 1.
    pub capacity: usize,
    /// Number of persistence workers. Values below 1 are raised to 1.
    pub workers: usize,
}

impl PipelineConfig {
    pub fn new(capacity: usize, workers: usize) -> Self {
        Self { capacity, workers }
    }
}

/// Result of a [`ClickPipeline::submit`] call.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    /// The queue was full or the pipeline has been stopped.
    Dropped,
}

impl SubmitOutcome {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Summary returned by [`ClickPipeline::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// `true` when every worker finished within the grace period.
    pub drained: bool,
    /// Events left in the queue when workers were aborted.
    pub abandoned: usize,
    /// Workers still running when the grace period ended.
    pub aborted_workers: usize,
}

/// Bounded FIFO of click events plus the worker pool draining it.
///
/// Constructed once at startup and shared through `Arc`.
pub struct ClickPipeline {
    /// `None` once shutdown has begun. Taking it under the write lock waits
    /// out every in-progress `submit`, so nothing is sent after the close.
    sender: RwLock<Option<mpsc::Sender<ClickEvent>>>,
    queue: SharedClickQueue,
    workers: Mutex<JoinSet<()>>,
    capacity: usize,
    worker_count: usize,
}

impl ClickPipeline {
    /// Creates the queue and spawns the workers.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<C>(config: PipelineConfig, repository: Arc<C>) -> Self
    where
        C: ClickRepository + ?Sized + 'static,
    {
        let capacity = config.capacity.max(1);
        let worker_count = config.workers.max(1);

        let (sender, receiver) = mpsc::channel(capacity);
        let queue = Arc::new(Mutex::new(receiver));

        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            workers.spawn(run_click_worker(worker_id, queue.clone(), repository.clone()));
        }

        info!(capacity, workers = worker_count, "Click pipeline started");

        Self {
            sender: RwLock::new(Some(sender)),
            queue,
            workers: Mutex::new(workers),
            capacity,
            worker_count,
        }
    }

    /// Enqueues a click event without blocking.
    ///
    /// Returns [`SubmitOutcome::Dropped`] when the queue is full or the
    /// pipeline is stopped. Drops are logged and counted in
    /// `clicks_dropped_total`; they are never an error for the caller.
    pub fn submit(&self, event: ClickEvent) -> SubmitOutcome {
        let sender = self.sender.read().unwrap_or_else(PoisonError::into_inner);

        let Some(sender) = sender.as_ref() else {
            counter!("clicks_dropped_total", "reason" => "stopped").increment(1);
            debug!(link_id = event.link_id, "Click pipeline stopped, dropping event");
            return SubmitOutcome::Dropped;
        };

        match sender.try_send(event) {
            Ok(()) => SubmitOutcome::Accepted,
            Err(TrySendError::Full(event)) => {
                counter!("clicks_dropped_total", "reason" => "full").increment(1);
                warn!(
                    link_id = event.link_id,
                    capacity = self.capacity(),
                    "Click queue full, dropping event"
                );
                SubmitOutcome::Dropped
            }
            Err(TrySendError::Closed(event)) => {
                counter!("clicks_dropped_total", "reason" => "closed").increment(1);
                warn!(link_id = event.link_id, "Click queue closed, dropping event");
                SubmitOutcome::Dropped
            }
        }
    }

    /// Maximum number of queued events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events waiting for a worker. Zero once shutdown has begun.
    pub fn queued(&self) -> usize {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |sender| sender.max_capacity() - sender.capacity())
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn is_accepting(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|sender| !sender.is_closed())
    }

    /// Stops the pipeline.
    ///
    /// New submissions are dropped from this point on. Workers drain the queue
    /// for at most `grace`; whatever is still queued afterwards is abandoned.
    /// Calling this again after the first shutdown returns immediately.
    pub async fn shutdown(&self, grace: Duration) -> ShutdownReport {
        let queued = self.queued();
        // Workers see the end of the queue once the last sender is gone.
        let closed = self
            .sender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(closed);

        let mut workers = self.workers.lock().await;

        if !workers.is_empty() {
            info!(
                queued,
                grace_ms = grace.as_millis() as u64,
                "Stopping click pipeline"
            );
        }

        let joined = tokio::time::timeout(grace, async {
            while let Some(result) = workers.join_next().await {
                if let Err(e) = result
                    && e.is_panic()
                {
                    error!(error = %e, "Click worker panicked");
                }
            }
        })
        .await;

        if joined.is_ok() {
            return ShutdownReport {
                drained: true,
                abandoned: 0,
                aborted_workers: 0,
            };
        }

        let aborted_workers = workers.len();

        workers.abort_all();
        while workers.join_next().await.is_some() {}

        let abandoned = self.queue.lock().await.len();

        warn!(
            abandoned,
            aborted_workers, "Click pipeline grace period elapsed, unconsumed events are lost"
        );

        ShutdownReport {
            drained: false,
            abandoned,
            aborted_workers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Click, NewClick};
    use crate::error::AppError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;
    use tokio::sync::{Notify, Semaphore};

    /// Click store whose writes wait on a gate and report when they begin.
    struct GatedRepository {
        recorded: std::sync::Mutex<Vec<NewClick>>,
        started: Notify,
        gate: Semaphore,
    }

    impl GatedRepository {
        fn open() -> Self {
            Self::with_permits(Semaphore::MAX_PERMITS)
        }

        fn closed() -> Self {
            Self::with_permits(0)
        }

        fn with_permits(permits: usize) -> Self {
            Self {
                recorded: std::sync::Mutex::new(Vec::new()),
                started: Notify::new(),
                gate: Semaphore::new(permits),
            }
        }

        fn recorded_link_ids(&self) -> Vec<i64> {
            self.recorded
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.link_id)
                .collect()
        }
    }

    #[async_trait]
    impl ClickRepository for GatedRepository {
        async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
            self.started.notify_one();
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| AppError::store("gate closed", json!({})))?;

            let mut recorded = self.recorded.lock().unwrap();
            recorded.push(new_click.clone());
            Ok(new_click.into_click(recorded.len() as i64))
        }

        async fn count_by_link(&self, link_id: i64) -> Result<i64, AppError> {
            Ok(self
                .recorded_link_ids()
                .into_iter()
                .filter(|id| *id == link_id)
                .count() as i64)
        }
    }

    struct FailingRepository {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl ClickRepository for FailingRepository {
        async fn record_click(&self, _new_click: NewClick) -> Result<Click, AppError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(AppError::store("disk full", json!({})))
        }

        async fn count_by_link(&self, _link_id: i64) -> Result<i64, AppError> {
            Ok(0)
        }
    }

    fn event(link_id: i64) -> ClickEvent {
        ClickEvent::new(link_id, Some("127.0.0.1".to_string()), Some("test-agent"))
    }

    #[tokio::test]
    async fn test_full_queue_drops_exactly_after_capacity() {
        const CAPACITY: usize = 3;
        let repo = Arc::new(GatedRepository::closed());
        let pipeline = ClickPipeline::start(PipelineConfig::new(CAPACITY, 1), repo.clone());

        // The single worker takes this event and blocks inside the store write.
        assert_eq!(pipeline.submit(event(0)), SubmitOutcome::Accepted);
        repo.started.notified().await;

        for i in 1..=CAPACITY as i64 {
            assert_eq!(pipeline.submit(event(i)), SubmitOutcome::Accepted);
        }
        assert_eq!(pipeline.queued(), CAPACITY);

        let started = Instant::now();
        let outcome = pipeline.submit(event(99));
        assert_eq!(outcome, SubmitOutcome::Dropped);
        assert!(started.elapsed() < Duration::from_millis(50));

        repo.gate.add_permits(16);
        let report = pipeline.shutdown(Duration::from_secs(5)).await;

        assert!(report.drained);
        let mut ids = repo.recorded_link_ids();
        ids.sort();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shutdown_persists_every_queued_event_once() {
        const K: i64 = 200;
        let repo = Arc::new(GatedRepository::open());
        let pipeline = ClickPipeline::start(PipelineConfig::new(K as usize, 4), repo.clone());

        for i in 0..K {
            assert!(pipeline.submit(event(i)).is_accepted());
        }

        let report = pipeline.shutdown(Duration::from_secs(10)).await;
        assert!(report.drained);
        assert_eq!(report.abandoned, 0);

        let ids = repo.recorded_link_ids();
        assert_eq!(ids.len(), K as usize);
        let unique: HashSet<i64> = ids.into_iter().collect();
        assert_eq!(unique, (0..K).collect::<HashSet<_>>());
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_dropped() {
        let repo = Arc::new(GatedRepository::open());
        let pipeline = ClickPipeline::start(PipelineConfig::new(10, 2), repo.clone());

        pipeline.shutdown(Duration::from_secs(1)).await;

        assert!(!pipeline.is_accepting());
        assert_eq!(pipeline.submit(event(1)), SubmitOutcome::Dropped);
        assert!(repo.recorded_link_ids().is_empty());
    }

    #[tokio::test]
    async fn test_write_failures_do_not_stop_workers() {
        let repo = Arc::new(FailingRepository {
            attempts: AtomicUsize::new(0),
        });
        let pipeline = ClickPipeline::start(PipelineConfig::new(10, 1), repo.clone());

        for i in 0..3 {
            assert!(pipeline.submit(event(i)).is_accepted());
        }

        let report = pipeline.shutdown(Duration::from_secs(5)).await;

        assert!(report.drained);
        assert_eq!(repo.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_grace_period_abandons_queued_events() {
        let repo = Arc::new(GatedRepository::closed());
        let pipeline = ClickPipeline::start(PipelineConfig::new(5, 1), repo.clone());

        for i in 0..3 {
            assert!(pipeline.submit(event(i)).is_accepted());
        }
        repo.started.notified().await;

        let report = pipeline.shutdown(Duration::from_millis(50)).await;

        assert!(!report.drained);
        assert_eq!(report.abandoned, 2);
        assert_eq!(report.aborted_workers, 1);
        assert!(repo.recorded_link_ids().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_submit_racing_shutdown_never_strands_events() {
        let repo = Arc::new(GatedRepository::open());
        let pipeline = Arc::new(ClickPipeline::start(
            PipelineConfig::new(1_000, 2),
            repo.clone(),
        ));

        let submitters: Vec<_> = (0..4)
            .map(|task| {
                let pipeline = pipeline.clone();
                tokio::spawn(async move {
                    let mut accepted = 0usize;
                    for i in 0..500 {
                        if pipeline.submit(event(task * 1_000 + i)).is_accepted() {
                            accepted += 1;
                        }
                        tokio::task::yield_now().await;
                    }
                    accepted
                })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let report = pipeline.shutdown(Duration::from_secs(10)).await;

        let mut accepted = 0;
        for submitter in submitters {
            accepted += submitter.await.unwrap();
        }

        assert!(report.drained);
        assert_eq!(report.abandoned, 0);
        assert_eq!(repo.recorded_link_ids().len(), accepted);
    }

    #[tokio::test]
    async fn test_second_shutdown_returns_immediately() {
        let repo = Arc::new(GatedRepository::open());
        let pipeline = ClickPipeline::start(PipelineConfig::new(4, 2), repo);

        let first = pipeline.shutdown(Duration::from_secs(1)).await;
        let second = pipeline.shutdown(Duration::from_secs(1)).await;

        assert!(first.drained);
        assert!(second.drained);
    }

    #[tokio::test]
    async fn test_zero_sizes_are_raised_to_one() {
        let repo = Arc::new(GatedRepository::open());
        let pipeline = ClickPipeline::start(PipelineConfig::new(0, 0), repo);

        assert_eq!(pipeline.capacity(), 1);
        assert_eq!(pipeline.worker_count(), 1);
        assert_eq!(pipeline.queued(), 0);

        pipeline.shutdown(Duration::from_secs(1)).await;
    }
}
