//! DTOs for the URL creation endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::{CreateUrl, CreatedUrl};

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten.
    #[validate(url(message = "Invalid URL format"))]
    pub original_url: String,

    /// Optional caller-chosen short code, checked by
    /// [`crate::utils::code_generator::validate_custom_code`].
    #[validate(length(min = 4, max = 10, message = "Custom code must be 4-10 characters"))]
    pub custom_code: Option<String>,

    /// Optional lifetime in hours.
    #[validate(range(min = 1, max = 100, message = "Duration must be between 1 and 100 hours"))]
    pub duration: Option<u32>,
}

impl From<ShortenRequest> for CreateUrl {
    fn from(request: ShortenRequest) -> Self {
        Self {
            original_url: request.original_url,
            custom_code: request.custom_code,
            duration_hours: request.duration,
        }
    }
}

/// Response for a created short URL.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub short_code: String,
    pub expired_at: DateTime<Utc>,
}

impl From<CreatedUrl> for ShortenResponse {
    fn from(created: CreatedUrl) -> Self {
        Self {
            short_url: created.short_url,
            short_code: created.short_code,
            expired_at: created.expired_at,
        }
    }
}
