//! Short URL creation, resolution and expiration cleanup.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{StoreError, UrlRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::CodeGenerator;

/// Number of generated codes tried before giving up with
/// [`AppError::AllocationExhausted`].
pub const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Longest lifetime a link may be created with.
pub const MAX_DURATION_HOURS: u32 = 100;

/// What to do when repopulating the cache after a read miss fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteBackPolicy {
    /// Fail the resolution with [`AppError::Cache`].
    #[default]
    Strict,
    /// Log the failure and still return the URL read from the store.
    Lenient,
}

impl FromStr for WriteBackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!(
                "unknown write-back policy '{}', expected 'strict' or 'lenient'",
                other
            )),
        }
    }
}

/// Static settings of a [`UrlService`].
#[derive(Debug, Clone)]
pub struct UrlServiceSettings {
    /// Prefix of every returned short URL, without trailing slash.
    pub base_url: String,
    /// Lifetime in hours of links created without an explicit duration.
    pub default_duration_hours: u32,
    pub write_back_policy: WriteBackPolicy,
}

/// Input for [`UrlService::create_url`].
#[derive(Debug, Clone)]
pub struct CreateUrl {
    pub original_url: String,
    pub custom_code: Option<String>,
    /// Lifetime in hours; the configured default applies when absent.
    pub duration_hours: Option<u32>,
}

/// Result of a successful [`UrlService::create_url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedUrl {
    pub short_code: String,
    pub short_url: String,
    pub expired_at: DateTime<Utc>,
}

/// Orchestrates code allocation, the durable store and the cache.
///
/// # Create
///
/// A custom code is checked for availability once and used as-is, or the call
/// fails with [`AppError::CodeConflict`]. Without one, up to
/// [`MAX_ALLOCATION_ATTEMPTS`] generated codes are tried. The record is written
/// to the store first and then mirrored into the cache.
///
/// # Resolve
///
/// Cache-aside: a cache hit answers directly, a clean miss reads the store and
/// repopulates the cache. Cache errors are never treated as misses.
///
/// The service holds no mutable state of its own; concurrent calls share only
/// the store and cache, whose uniqueness constraint is the sole point of mutual
/// exclusion.
pub struct UrlService {
    repository: Arc<dyn UrlRepository>,
    cache: Arc<dyn CacheService>,
    generator: Arc<dyn CodeGenerator>,
    settings: UrlServiceSettings,
}

impl UrlService {
    /// Creates a new URL service.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        cache: Arc<dyn CacheService>,
        generator: Arc<dyn CodeGenerator>,
        settings: UrlServiceSettings,
    ) -> Self {
        Self {
            repository,
            cache,
            generator,
            settings,
        }
    }

    /// Creates a short URL.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `duration_hours` is zero or above
    ///   [`MAX_DURATION_HOURS`]
    /// - [`AppError::CodeConflict`] if the custom code is taken, including when a
    ///   concurrent insert wins the race after the availability check
    /// - [`AppError::AllocationExhausted`] if every generated code collided
    /// - [`AppError::Store`] on store failure; the cache is left untouched
    /// - [`AppError::Cache`] if mirroring into the cache fails; the record is
    ///   already durable at that point
    pub async fn create_url(&self, request: CreateUrl) -> Result<CreatedUrl, AppError> {
        let hours = request
            .duration_hours
            .unwrap_or(self.settings.default_duration_hours);
        if hours == 0 || hours > MAX_DURATION_HOURS {
            return Err(AppError::bad_request(
                format!("Duration must be between 1 and {} hours", MAX_DURATION_HOURS),
                json!({ "duration": hours }),
            ));
        }
        let expired_at = Utc::now()
            .checked_add_signed(Duration::hours(i64::from(hours)))
            .ok_or_else(|| {
                AppError::bad_request("Duration out of range", json!({ "duration": hours }))
            })?;

        let record = match request.custom_code {
            Some(code) => {
                self.insert_custom(request.original_url, code, expired_at)
                    .await?
            }
            None => {
                self.insert_generated(request.original_url, expired_at)
                    .await?
            }
        };

        self.cache.set(&record).await?;

        info!(
            short_code = %record.short_code,
            is_custom = record.is_custom,
            expired_at = %record.expired_at,
            "Short URL created"
        );

        Ok(CreatedUrl {
            short_url: self.short_url(&record.short_code),
            short_code: record.short_code,
            expired_at: record.expired_at,
        })
    }

    /// Resolves a short code to its original URL.
    ///
    /// # Errors
    ///
    /// - [`AppError::Cache`] if the cache lookup fails, or if repopulating it
    ///   fails under [`WriteBackPolicy::Strict`]
    /// - [`AppError::NotFound`] if the store has no live record for the code
    /// - [`AppError::Store`] on store failure
    pub async fn resolve(&self, short_code: &str) -> Result<String, AppError> {
        if let Some(record) = self.cache.get(short_code).await? {
            debug!("Cache HIT for {}", short_code);
            metrics::counter!("cache_hits_total").increment(1);
            return Ok(record.original_url);
        }

        debug!("Cache MISS for {}", short_code);
        metrics::counter!("cache_misses_total").increment(1);

        let record = self
            .repository
            .find_by_short_code(short_code)
            .await?
            .filter(|record| !record.is_expired_at(Utc::now()))
            .ok_or_else(|| AppError::not_found(short_code))?;

        if let Err(e) = self.cache.set(&record).await {
            match self.settings.write_back_policy {
                WriteBackPolicy::Strict => return Err(e.into()),
                WriteBackPolicy::Lenient => {
                    warn!("Failed to repopulate cache for {}: {}", short_code, e);
                }
            }
        }

        Ok(record.original_url)
    }

    /// Purges every expired record from the durable store.
    ///
    /// Cached entries are not invalidated; their TTL never exceeds the record's
    /// expiration.
    pub async fn run_cleanup_once(&self) -> Result<u64, AppError> {
        let deleted = self.repository.delete_expired().await?;
        metrics::counter!("expired_urls_deleted_total").increment(deleted);

        Ok(deleted)
    }

    /// Constructs the full short URL for a code.
    pub fn short_url(&self, short_code: &str) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            short_code
        )
    }

    async fn insert_custom(
        &self,
        original_url: String,
        short_code: String,
        expired_at: DateTime<Utc>,
    ) -> Result<UrlRecord, AppError> {
        if !self
            .repository
            .is_short_code_available(&short_code)
            .await?
        {
            return Err(AppError::conflict(short_code));
        }

        let new_record = NewUrlRecord {
            short_code,
            original_url,
            expired_at,
            is_custom: true,
        };

        match self.repository.create(new_record).await {
            Ok(record) => Ok(record),
            Err(StoreError::AlreadyExists { code }) => Err(AppError::conflict(code)),
            Err(e) => Err(e.into()),
        }
    }

    /// Tries up to [`MAX_ALLOCATION_ATTEMPTS`] generated codes.
    ///
    /// A code lost to a concurrent insert after passing the availability check
    /// counts as a collision and consumes one attempt.
    async fn insert_generated(
        &self,
        original_url: String,
        expired_at: DateTime<Utc>,
    ) -> Result<UrlRecord, AppError> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let short_code = self.generator.generate();

            if !self
                .repository
                .is_short_code_available(&short_code)
                .await?
            {
                debug!("Collision on {} (attempt {})", short_code, attempt);
                metrics::counter!("code_collisions_total").increment(1);
                continue;
            }

            let new_record = NewUrlRecord {
                short_code,
                original_url: original_url.clone(),
                expired_at,
                is_custom: false,
            };

            match self.repository.create(new_record).await {
                Ok(record) => return Ok(record),
                Err(StoreError::AlreadyExists { code }) => {
                    warn!("Lost insert race on {} (attempt {})", code, attempt);
                    metrics::counter!("code_collisions_total").increment(1);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::AllocationExhausted {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }
}
