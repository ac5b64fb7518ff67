//! HTTP server initialization and runtime setup.
//!
//! Handles storage setup, the click pipeline, the link monitor, and the Axum
//! server lifecycle including graceful shutdown.

use crate::application::services::{LinkMonitor, LinkService, StatsService};
use crate::config::Config;
use crate::domain::click_pipeline::ClickPipeline;
use crate::infrastructure::persistence::Stores;
use crate::infrastructure::probe::HttpProbe;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs the service with the given configuration.
///
/// Initializes:
/// - Link and click stores (PostgreSQL with migrations, or in-memory)
/// - Click ingestion pipeline and its workers
/// - Link health monitor
/// - Axum HTTP server
///
/// On SIGINT/SIGTERM the monitor is cancelled and the server stops accepting
/// connections and finishes in-flight requests. The click queue is then
/// drained within `SHUTDOWN_GRACE_SECONDS`.
///
/// # Errors
///
/// Returns an error if:
/// - Storage setup fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let stores = Stores::from_config(&config).await?;

    let pipeline = Arc::new(ClickPipeline::start(
        config.pipeline_config(),
        stores.clicks.clone(),
    ));

    let link_service = Arc::new(LinkService::new(stores.links.clone(), config.code_policy()));
    let stats_service = Arc::new(StatsService::new(
        stores.links.clone(),
        stores.clicks.clone(),
    ));

    let monitor_config = config.monitor_config();
    let probe = Arc::new(
        HttpProbe::new(monitor_config.probe_timeout).context("Failed to build HTTP probe")?,
    );
    let monitor = LinkMonitor::new(stores.links.clone(), probe, monitor_config);
    let monitor_cancel = CancellationToken::new();
    let monitor_task = tokio::spawn({
        let cancel = monitor_cancel.clone();
        async move { monitor.run(cancel).await }
    });

    let state = AppState::new(
        link_service,
        stats_service,
        pipeline.clone(),
        config.base_url.clone(),
        config.behind_proxy,
    );

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(cancel_on(shutdown_signal(), monitor_cancel.clone()))
    .await?;

    tracing::info!("HTTP server stopped, draining click queue");

    let report = pipeline.shutdown(config.shutdown_grace()).await;

    monitor_cancel.cancel();
    if let Err(e) = monitor_task.await {
        tracing::error!(error = %e, "Link monitor task failed");
    }

    if let Some(pool) = stores.pool {
        pool.close().await;
    }

    tracing::info!(
        drained = report.drained,
        abandoned = report.abandoned,
        "Shutdown complete"
    );

    Ok(())
}

/// Waits for `signal`, then fires `cancel` before resolving.
async fn cancel_on(signal: impl Future<Output = ()>, cancel: CancellationToken) {
    signal.await;
    cancel.cancel();
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
