//! Repository trait for the durable short code store.

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a [`UrlRepository`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's uniqueness constraint rejected the insert.
    #[error("short code already exists: {code}")]
    AlreadyExists { code: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Authoritative mapping from short code to [`UrlRecord`].
///
/// Implementations must be safe for concurrent use and must enforce short code
/// uniqueness at insert time: the availability check and the insert are not
/// atomic as a pair.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - In-memory fake for tests
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Returns true if no record, live or expired, occupies `code`.
    async fn is_short_code_available(&self, code: &str) -> Result<bool, StoreError>;

    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if the short code is taken.
    async fn create(&self, new_record: NewUrlRecord) -> Result<UrlRecord, StoreError>;

    /// Finds a record by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(UrlRecord))` if found
    /// - `Ok(None)` if not found
    async fn find_by_short_code(&self, code: &str) -> Result<Option<UrlRecord>, StoreError>;

    /// Removes every record whose `expired_at <= now` and returns how many were deleted.
    async fn delete_expired(&self) -> Result<u64, StoreError>;

    /// Checks if the store backend is reachable.
    async fn health_check(&self) -> bool;
}
