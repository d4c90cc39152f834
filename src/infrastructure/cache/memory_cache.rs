//! In-process cache used by the test suite and local runs.

use super::service::{CacheError, CacheResult, CacheService, entry_ttl};
use crate::domain::entities::UrlRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

struct Entry {
    record: UrlRecord,
    evict_at: DateTime<Utc>,
}

/// HashMap-backed [`CacheService`] with the same TTL rules as [`super::RedisCache`].
///
/// Keeps its own clock, which tests can move forward with
/// [`MemoryCache::advance_clock`] to age entries out. [`MemoryCache::set_failing`]
/// makes every operation return a [`CacheError`].
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    max_ttl: Duration,
    clock_offset_ms: AtomicI64,
    failing: AtomicBool,
}

impl MemoryCache {
    pub fn new(max_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_ttl,
            clock_offset_ms: AtomicI64::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Moves this cache's clock forward.
    pub fn advance_clock(&self, by: chrono::Duration) {
        self.clock_offset_ms
            .fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    /// Toggles simulated backend failure.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = self.now();
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|e| e.evict_at > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now() + chrono::Duration::milliseconds(self.clock_offset_ms.load(Ordering::SeqCst))
    }

    fn check_available(&self) -> CacheResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::ConnectionError(
                "memory cache marked as failing".to_string(),
            ));
        }
        Ok(())
    }

    fn lock(&self) -> CacheResult<std::sync::MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Operation("memory cache lock poisoned".to_string()))
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, short_code: &str) -> CacheResult<Option<UrlRecord>> {
        self.check_available()?;
        let now = self.now();
        let mut entries = self.lock()?;

        let live = entries
            .get(short_code)
            .filter(|entry| entry.evict_at > now)
            .map(|entry| entry.record.clone());

        if live.is_none() {
            entries.remove(short_code);
        }
        Ok(live)
    }

    async fn set(&self, record: &UrlRecord) -> CacheResult<()> {
        self.check_available()?;
        let now = self.now();

        let Some(ttl) = entry_ttl(record, now, self.max_ttl) else {
            return Ok(());
        };
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| CacheError::Operation(format!("invalid TTL: {}", e)))?;

        self.lock()?.insert(
            record.short_code.clone(),
            Entry {
                record: record.clone(),
                evict_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.check_available()?;
        self.lock()?.remove(short_code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.failing.load(Ordering::SeqCst)
    }
}
