//! Handler for link creation.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, CreateLinkResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a long URL.
///
/// # Endpoint
///
/// `POST /api/v1/links`
///
/// # Request Body
///
/// ```json
/// { "long_url": "https://example.com/page" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "short_code": "aZ3kP9",
///   "long_url": "https://example.com/page",
///   "full_short_url": "http://localhost:3000/aZ3kP9"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for a malformed body or URL.
/// Returns 500 Internal Server Error if no free code was found or the store failed.
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    let Json(request) = payload.map_err(|e| {
        AppError::bad_request("Invalid request body", json!({ "reason": e.body_text() }))
    })?;

    request.validate()?;

    let link = state.link_service.create_link(&request.long_url).await?;
    let full_short_url = state.link_service.short_url(&state.base_url, &link.code);

    Ok((
        StatusCode::CREATED,
        Json(CreateLinkResponse {
            short_code: link.code,
            long_url: link.long_url,
            full_short_url,
        }),
    ))
}
