//! URL record entity mapping a short code to its original URL.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A stored short code mapping with its expiration metadata.
///
/// The whole record is serialized into the cache, so a cache hit carries the
/// same `expired_at` the durable store holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub is_custom: bool,
    pub created_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Creates a new UrlRecord instance.
    pub fn new(
        id: i64,
        short_code: String,
        original_url: String,
        is_custom: bool,
        created_at: DateTime<Utc>,
        expired_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            short_code,
            original_url,
            is_custom,
            created_at,
            expired_at,
        }
    }

    /// Returns true if the record's expiration has passed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expired_at <= now
    }

    /// Time left until expiration, or `None` once expired.
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Option<Duration> {
        let remaining = self.expired_at - now;
        (remaining > Duration::zero()).then_some(remaining)
    }
}

/// Input data for inserting a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub short_code: String,
    pub original_url: String,
    pub expired_at: DateTime<Utc>,
    pub is_custom: bool,
}
