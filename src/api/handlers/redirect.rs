//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use std::net::SocketAddr;
use tracing::debug;
use url::Url;

use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Look the code up in the link store
/// 2. Submit a click event to the ingestion pipeline (never waits)
/// 3. Return 302 Found with the long URL in `Location`
///
/// # Click Tracking
///
/// If the click queue is full the click is dropped; the redirect is served
/// regardless.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist. Nothing is
/// enqueued in that case.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.get_link_by_code(&code).await?;
    let location = location_header(&link.long_url)?;

    let event = ClickEvent::new(
        link.id,
        Some(client_ip(&headers, addr, state.behind_proxy)),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
    );

    if !state.click_pipeline.submit(event).is_accepted() {
        debug!(%code, "Click not recorded");
    }

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]))
}

/// Builds the `Location` value, percent-encoding non-ASCII targets.
fn location_header(long_url: &str) -> Result<HeaderValue, AppError> {
    if long_url.is_ascii()
        && let Ok(value) = HeaderValue::from_str(long_url)
    {
        return Ok(value);
    }

    Url::parse(long_url)
        .ok()
        .and_then(|url| HeaderValue::from_str(url.as_str()).ok())
        .ok_or_else(|| {
            AppError::store(
                "Stored URL is not a valid redirect target",
                json!({ "long_url": long_url }),
            )
        })
}
