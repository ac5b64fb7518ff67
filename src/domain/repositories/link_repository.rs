//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable mapping from short code to long URL.
///
/// Implementations must be safe for concurrent use by many callers; the
/// link service relies on [`LinkRepository::create`] to reject duplicate codes
/// even when two creators race between lookup and insert.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists.
    /// Returns [`AppError::Store`] on any other storage failure.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if the code is taken
    /// - `Ok(None)` if the code is free
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on storage failures. Callers must not treat
    /// this as "not found".
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Returns a snapshot of every stored link, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on storage failures.
    async fn list_all(&self) -> Result<Vec<Link>, AppError>;

    /// Counts the clicks recorded for a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on storage failures.
    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
