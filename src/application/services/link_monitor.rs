//! Periodic liveness sweep over every stored link.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::entities::Link;
use crate::domain::link_health::{LinkHealth, LinkProbe};
use crate::domain::repositories::LinkRepository;

/// Sweep cadence and probe limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    pub interval: Duration,
    /// Upper bound for a single probe, including any fallback request.
    pub probe_timeout: Duration,
    /// Probes in flight at once.
    pub concurrency: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
            probe_timeout: Duration::from_secs(5),
            concurrency: 8,
        }
    }
}

/// Outcome counts of one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub checked: usize,
    pub reachable: usize,
    pub unreachable: usize,
    pub errors: usize,
    /// The sweep was interrupted before every link was checked.
    pub cancelled: bool,
}

impl SweepReport {
    fn record(&mut self, link: &Link, health: &LinkHealth) {
        self.checked += 1;

        match health {
            LinkHealth::Reachable { .. } => {
                self.reachable += 1;
                info!(code = %link.code, url = %link.long_url, %health, "Link reachable");
            }
            LinkHealth::Unreachable { .. } => {
                self.unreachable += 1;
                warn!(code = %link.code, url = %link.long_url, %health, "Link unreachable");
            }
            LinkHealth::Error { .. } => {
                self.errors += 1;
                warn!(code = %link.code, url = %link.long_url, %health, "Link check failed");
            }
        }
    }

    fn record_join_error(&mut self, e: JoinError) {
        if !e.is_cancelled() {
            self.errors += 1;
            error!(error = %e, "Link check task panicked");
        }
    }
}

/// Background task reporting which long URLs still answer.
///
/// Results are only logged; links are never modified.
pub struct LinkMonitor<L: LinkRepository + ?Sized, P: LinkProbe + ?Sized> {
    link_repository: Arc<L>,
    probe: Arc<P>,
    config: MonitorConfig,
}

impl<L, P> LinkMonitor<L, P>
where
    L: LinkRepository + ?Sized,
    P: LinkProbe + ?Sized + 'static,
{
    pub fn new(link_repository: Arc<L>, probe: Arc<P>, config: MonitorConfig) -> Self {
        Self {
            link_repository,
            probe,
            config,
        }
    }

    /// Sweeps every `interval` until `cancel` fires.
    ///
    /// The first sweep starts one full interval after the call.
    pub async fn run(&self, cancel: CancellationToken) {
        let period = self.config.interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = period.as_secs(),
            concurrency = self.config.concurrency,
            "Link monitor started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if self.sweep(&cancel).await.cancelled {
                break;
            }
        }

        info!("Link monitor stopped");
    }

    /// Probes every stored link once.
    ///
    /// A store failure while listing links skips the sweep and returns an
    /// empty report. On cancellation, probes in flight are aborted and the
    /// report carries what finished so far.
    pub async fn sweep(&self, cancel: &CancellationToken) -> SweepReport {
        let started = Instant::now();
        let mut report = SweepReport::default();

        let links = match self.link_repository.list_all().await {
            Ok(links) => links,
            Err(e) => {
                error!(error = %e, "Failed to list links, skipping health sweep");
                return report;
            }
        };

        debug!(links = links.len(), "Link health sweep started");

        let permits = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut checks = JoinSet::new();

        for link in links {
            let permit = tokio::select! {
                _ = cancel.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let probe = self.probe.clone();
            let timeout = self.config.probe_timeout;

            checks.spawn(async move {
                let _permit = permit;
                let health = match tokio::time::timeout(timeout, probe.probe(&link.long_url)).await
                {
                    Ok(health) => health,
                    Err(_) => LinkHealth::error(format!("timed out after {}ms", timeout.as_millis())),
                };
                (link, health)
            });

            while let Some(joined) = checks.try_join_next() {
                match joined {
                    Ok((link, health)) => report.record(&link, &health),
                    Err(e) => report.record_join_error(e),
                }
            }
        }

        while !checks.is_empty() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    report.cancelled = true;
                    checks.abort_all();
                    break;
                }
                Some(joined) = checks.join_next() => match joined {
                    Ok((link, health)) => report.record(&link, &health),
                    Err(e) => report.record_join_error(e),
                },
            }
        }

        if report.cancelled {
            info!(checked = report.checked, "Link health sweep cancelled");
        } else {
            info!(
                checked = report.checked,
                reachable = report.reachable,
                unreachable = report.unreachable,
                errors = report.errors,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Link health sweep finished"
            );
        }

        report
    }
}
