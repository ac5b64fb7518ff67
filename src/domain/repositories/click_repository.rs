//! Repository trait for the click log.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;

/// Append-only log of click events.
///
/// Written by the click pipeline workers and read for statistics.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on storage failures, including a reference
    /// to a link that does not exist.
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Counts the clicks recorded for a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on storage failures.
    async fn count_by_link(&self, link_id: i64) -> Result<i64, AppError>;
}
