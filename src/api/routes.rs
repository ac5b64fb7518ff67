//! API route configuration.

use crate::api::handlers::{create_link_handler, stats_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Versioned REST routes, nested under `/api/v1`.
///
/// # Endpoints
///
/// - `POST /links`              - Create a short link
/// - `GET  /links/{code}/stats` - Click count for a short link
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link_handler))
        .route("/links/{code}/stats", get(stats_handler))
}
