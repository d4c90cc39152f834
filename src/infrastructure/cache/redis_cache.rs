//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService, entry_ttl};
use crate::domain::entities::UrlRecord;
use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

/// Redis cache holding JSON-encoded [`UrlRecord`]s under `url:{short_code}`.
///
/// Uses `ConnectionManager` for connection reuse and reconnects. Errors are
/// returned to the caller rather than being treated as misses.
pub struct RedisCache {
    client: ConnectionManager,
    max_ttl: Duration,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `max_ttl_seconds` - Upper bound on any entry TTL (`CACHE_TTL_SECONDS`);
    ///   entries never outlive their record's `expired_at` either
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, max_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            max_ttl: Duration::from_secs(max_ttl_seconds),
            key_prefix: "url:".to_string(),
        })
    }

    fn build_key(&self, short_code: &str) -> String {
        format!("{}{}", self.key_prefix, short_code)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, short_code: &str) -> CacheResult<Option<UrlRecord>> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        let payload = conn
            .get::<_, Option<String>>(&key)
            .await
            .map_err(|e| CacheError::Operation(format!("GET {}: {}", key, e)))?;

        match payload {
            Some(json) => {
                debug!("Cache HIT: {}", short_code);
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => {
                debug!("Cache MISS: {}", short_code);
                Ok(None)
            }
        }
    }

    async fn set(&self, record: &UrlRecord) -> CacheResult<()> {
        let Some(ttl) = entry_ttl(record, Utc::now(), self.max_ttl) else {
            debug!("Skipping cache SET for expired {}", record.short_code);
            return Ok(());
        };

        let key = self.build_key(&record.short_code);
        let payload = serde_json::to_string(record)?;
        let mut conn = self.client.clone();

        conn.set_ex::<_, _, ()>(&key, payload, ttl.as_secs())
            .await
            .map_err(|e| CacheError::Operation(format!("SET {}: {}", key, e)))?;

        debug!(
            "Cache SET: {} -> {} (TTL: {}s)",
            record.short_code,
            record.original_url,
            ttl.as_secs()
        );
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        let deleted = conn
            .del::<_, i32>(&key)
            .await
            .map_err(|e| CacheError::Operation(format!("DEL {}: {}", key, e)))?;

        if deleted > 0 {
            debug!("Cache INVALIDATE: {}", short_code);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
