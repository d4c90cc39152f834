//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Lookup goes through [`crate::application::services::UrlService::resolve`]
/// (cache first, then the durable store). Links expire, so the redirect is
/// always `307 Temporary Redirect`.
///
/// # Errors
///
/// - 404 if the short code does not exist or has expired
/// - 503 if the store or cache is unavailable
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let original_url = state.url_service.resolve(&code).await?;

    Ok(Redirect::temporary(&original_url))
}
