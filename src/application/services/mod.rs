//! Business logic services for the application layer.

pub mod url_service;

pub use url_service::{
    CreateUrl, CreatedUrl, MAX_ALLOCATION_ATTEMPTS, MAX_DURATION_HOURS, UrlService, UrlServiceSettings,
    WriteBackPolicy,
};
