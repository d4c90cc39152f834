//! Cache service trait and error types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::domain::entities::UrlRecord;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    Operation(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Best-effort, TTL-bound mirror of individual [`UrlRecord`]s keyed by short code.
///
/// Unlike a fail-open cache, implementations must report infrastructure errors:
/// `Ok(None)` from [`CacheService::get`] means a clean miss and nothing else.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process cache used by tests
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the cached record for a short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` on cache hit
    /// - `Ok(None)` on a clean cache miss
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend cannot answer.
    async fn get(&self, short_code: &str) -> CacheResult<Option<UrlRecord>>;

    /// Stores a record, overwriting any existing entry for its short code.
    ///
    /// The entry TTL is bounded by the time left until `record.expired_at`
    /// (see [`entry_ttl`]); an already expired record is not cached.
    async fn set(&self, record: &UrlRecord) -> CacheResult<()>;

    /// Removes a cached entry.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}

/// Computes the TTL for caching `record` at `now`.
///
/// The result never exceeds `expired_at - now` nor `max_ttl`. Returns `None`
/// when the record has less than one whole second left.
pub fn entry_ttl(record: &UrlRecord, now: DateTime<Utc>, max_ttl: Duration) -> Option<Duration> {
    let remaining = record.remaining_ttl(now)?.to_std().ok()?;
    let ttl = remaining.min(max_ttl);
    let whole_seconds = Duration::from_secs(ttl.as_secs());

    (!whole_seconds.is_zero()).then_some(whole_seconds)
}
