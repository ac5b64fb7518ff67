//! Link creation and retrieval service.

use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::generate_code;
use crate::utils::url_validator::validate_long_url;
use serde_json::json;
use tracing::{error, info, warn};

/// Short code shape and collision budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePolicy {
    /// Number of characters in a generated code.
    pub length: usize,
    /// Candidates tried before giving up with [`AppError::ExhaustedRetries`].
    pub max_attempts: u32,
}

impl Default for CodePolicy {
    fn default() -> Self {
        Self {
            length: 6,
            max_attempts: 5,
        }
    }
}

/// Service for creating and retrieving short links.
///
/// Codes are random; uniqueness is enforced by looking the candidate up and
/// by the store's own uniqueness check on insert.
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    policy: CodePolicy,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<L>, policy: CodePolicy) -> Self {
        Self {
            link_repository,
            policy,
        }
    }

    /// Creates a short link with a fresh random code.
    ///
    /// # Code Allocation
    ///
    /// Each attempt generates a candidate and looks it up:
    ///
    /// - free: the link is inserted
    /// - taken: collision, next attempt
    /// - lookup error: abort without retrying
    ///
    /// A uniqueness conflict on insert means another creator claimed the same
    /// code between lookup and insert; it counts as a collision and uses up an
    /// attempt from the same budget.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `long_url` is not an absolute http(s) URL
    /// - [`AppError::Store`] if the store fails for any reason other than a collision
    /// - [`AppError::ExhaustedRetries`] if every attempt collided
    /// - [`AppError::RandomSource`] if no secure randomness is available
    ///
    /// Nothing is written when an error is returned.
    pub async fn create_link(&self, long_url: &str) -> Result<Link, AppError> {
        let long_url = validate_long_url(long_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            let code = generate_code(self.policy.length)?;

            if self.link_repository.find_by_code(&code).await?.is_some() {
                warn!(code, attempt, max_attempts, "Short code collision, retrying");
                continue;
            }

            let new_link = NewLink::now(code.clone(), long_url.to_string());

            match self.link_repository.create(new_link).await {
                Ok(link) => {
                    info!(code = %link.code, link_id = link.id, "Short link created");
                    return Ok(link);
                }
                Err(e) if e.is_conflict() => {
                    warn!(
                        code,
                        attempt, max_attempts, "Short code claimed concurrently, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        error!(max_attempts, "Short code space exhausted");

        Err(AppError::ExhaustedRetries {
            attempts: max_attempts,
        })
    }

    /// Retrieves a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    /// Returns [`AppError::Store`] on storage errors.
    pub async fn get_link_by_code(&self, code: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    /// Retrieves a link together with its click count.
    ///
    /// # Errors
    ///
    /// See [`Self::get_link_by_code`].
    pub async fn get_link_stats(&self, code: &str) -> Result<(Link, i64), AppError> {
        let link = self.get_link_by_code(code).await?;
        let clicks = self.link_repository.count_clicks(link.id).await?;

        Ok((link, clicks))
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, base_url: &str, code: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), code)
    }

    /// Checks that the link store answers.
    pub async fn check_store(&self) -> Result<(), AppError> {
        self.link_repository.ping().await
    }
}
