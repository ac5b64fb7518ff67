//! Storage backends for links and clicks.
//!
//! Concrete implementations of the domain repository traits.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage and retrieval in PostgreSQL
//! - [`PgClickRepository`] - Click log in PostgreSQL
//! - [`MemoryStore`] - In-process implementation of both traits
//!
//! [`Stores::from_config`] picks the backend named by `STORAGE`.

pub mod memory_store;
pub mod pg_click_repository;
pub mod pg_link_repository;

pub use memory_store::MemoryStore;
pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::config::{Config, StorageBackend, mask_connection_string};
use crate::domain::repositories::{ClickRepository, LinkRepository};

const CONNECT_ATTEMPTS: usize = 5;

/// Opens a PostgreSQL pool, retrying with exponential backoff.
///
/// # Errors
///
/// Returns the last connection error once every attempt has failed.
pub async fn connect(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not configured")?;

    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    // 200ms, 400ms, 800ms, ...
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(100)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(CONNECT_ATTEMPTS - 1);

    let pool = Retry::spawn(strategy, || async {
        options.clone().connect(database_url).await.inspect_err(|e| {
            tracing::warn!(
                database = %mask_connection_string(database_url),
                error = %e,
                "Database connection attempt failed"
            );
        })
    })
    .await
    .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    Ok(pool)
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to apply migrations")?;

    tracing::info!("Database migrations applied");

    Ok(())
}

/// The link and click stores selected by configuration.
pub struct Stores {
    pub links: Arc<dyn LinkRepository>,
    pub clicks: Arc<dyn ClickRepository>,
    /// Present for the Postgres backend.
    pub pool: Option<PgPool>,
}

impl Stores {
    /// Both stores backed by one in-memory instance.
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());

        Self {
            links: store.clone(),
            clicks: store,
            pool: None,
        }
    }

    /// Both stores backed by one PostgreSQL pool.
    pub fn postgres(pool: PgPool) -> Self {
        let shared = Arc::new(pool.clone());

        Self {
            links: Arc::new(PgLinkRepository::new(shared.clone())),
            clicks: Arc::new(PgClickRepository::new(shared)),
            pool: Some(pool),
        }
    }

    /// Builds the configured backend, connecting and migrating for Postgres.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached or migrated.
    pub async fn from_config(config: &Config) -> Result<Self> {
        match config.storage {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; links and clicks are not persisted");
                Ok(Self::memory())
            }
            StorageBackend::Postgres => {
                let pool = connect(config).await?;
                run_migrations(&pool).await?;
                Ok(Self::postgres(pool))
            }
        }
    }
}
