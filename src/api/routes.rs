//! API route configuration.

use crate::api::handlers::shorten_handler;
use crate::state::AppState;
use axum::{Router, routing::post};

/// API routes mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /url` - Create a short URL
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/url", post(shorten_handler))
}
