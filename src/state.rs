//! Shared application state injected into HTTP handlers.

use std::sync::Arc;

use crate::application::services::UrlService;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::cache::CacheService;

/// State cloned into every request handler.
///
/// `repository` and `cache` are the same instances the service uses; handlers
/// only touch them for health checks.
#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService>,
    pub repository: Arc<dyn UrlRepository>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    pub fn new(
        url_service: Arc<UrlService>,
        repository: Arc<dyn UrlRepository>,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        Self {
            url_service,
            repository,
            cache,
        }
    }
}
