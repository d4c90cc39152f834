//! Handler for the URL creation endpoint.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::code_generator::validate_custom_code;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /api/url`
///
/// # Request Body
///
/// ```json
/// {
///   "original_url": "https://example.com",
///   "custom_code": "promo",   // optional, 4-10 letters/digits
///   "duration": 12            // optional, hours (1-100)
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "short_url": "https://sho.rt/promo",
///   "short_code": "promo",
///   "expired_at": "2025-01-01T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 if validation fails
/// - 409 if the custom code is taken or no free code could be allocated
/// - 503 if the store or cache is unavailable
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    if let Some(code) = &payload.custom_code {
        validate_custom_code(code)?;
    }

    let created = state.url_service.create_url(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}
