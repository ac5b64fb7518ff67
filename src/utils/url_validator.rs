//! Long URL validation.
//!
//! The link service accepts only absolute `http`/`https` URLs with a host.
//! Validation happens at the HTTP boundary and again in the service so that
//! malformed input never reaches the store.

use url::Url;

/// Maximum accepted length of a long URL, in bytes.
pub const MAX_URL_LENGTH: usize = 2048;

/// Reasons a long URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL exceeds {MAX_URL_LENGTH} bytes")]
    TooLong,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Validates a long URL and returns it trimmed.
///
/// # Rules
///
/// 1. Surrounding whitespace is ignored
/// 2. Must parse as an absolute URL
/// 3. Scheme must be `http` or `https`
/// 4. Must have a non-empty host
///
/// The URL is otherwise returned exactly as submitted, so visitors are
/// redirected to the same string the creator provided.
///
/// # Errors
///
/// Returns the first rule violated as a [`UrlValidationError`].
///
/// # Examples
///
/// ```ignore
/// assert_eq!(validate_long_url(" https://example.com/page ").unwrap(), "https://example.com/page");
/// assert!(validate_long_url("javascript:alert(1)").is_err());
/// ```
pub fn validate_long_url(input: &str) -> Result<&str, UrlValidationError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    if trimmed.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    let url = Url::parse(trimmed).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(trimmed),
        _ => Err(UrlValidationError::MissingHost),
    }
}
