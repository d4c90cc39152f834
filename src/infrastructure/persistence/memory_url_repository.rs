//! In-memory URL repository used by the test suite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{StoreError, UrlRepository};

/// HashMap-backed [`UrlRepository`] that behaves like the PostgreSQL one.
///
/// - Uniqueness is checked under the same lock as the insert.
/// - [`InMemoryUrlRepository::advance_clock`] moves the clock used by
///   `delete_expired` and `created_at`.
/// - [`InMemoryUrlRepository::set_failing`] makes every call return
///   [`StoreError::Unavailable`].
#[derive(Default)]
pub struct InMemoryUrlRepository {
    records: Mutex<HashMap<String, UrlRecord>>,
    next_id: AtomicI64,
    clock_offset_ms: AtomicI64,
    failing: AtomicBool,
    availability_checks: AtomicUsize,
}

impl InMemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record directly, bypassing the uniqueness check.
    pub fn seed(&self, record: UrlRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.insert(record.short_code.clone(), record);
        }
    }

    /// Moves the repository clock forward.
    pub fn advance_clock(&self, by: chrono::Duration) {
        self.clock_offset_ms
            .fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    /// Toggles simulated backend failure.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// How many times `is_short_code_available` has been called.
    pub fn availability_checks(&self) -> usize {
        self.availability_checks.load(Ordering::SeqCst)
    }

    /// Number of stored records, expired ones included.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now() + chrono::Duration::milliseconds(self.clock_offset_ms.load(Ordering::SeqCst))
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, UrlRecord>>, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store marked as failing".to_string(),
            ));
        }

        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn is_short_code_available(&self, code: &str) -> Result<bool, StoreError> {
        self.availability_checks.fetch_add(1, Ordering::SeqCst);
        Ok(!self.lock()?.contains_key(code))
    }

    async fn create(&self, new_record: NewUrlRecord) -> Result<UrlRecord, StoreError> {
        let now = self.now();
        let mut records = self.lock()?;

        if records.contains_key(&new_record.short_code) {
            return Err(StoreError::AlreadyExists {
                code: new_record.short_code,
            });
        }

        let record = UrlRecord::new(
            self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            new_record.short_code,
            new_record.original_url,
            new_record.is_custom,
            now,
            new_record.expired_at,
        );
        records.insert(record.short_code.clone(), record.clone());

        Ok(record)
    }

    async fn find_by_short_code(&self, code: &str) -> Result<Option<UrlRecord>, StoreError> {
        Ok(self.lock()?.get(code).cloned())
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        let now = self.now();
        let mut records = self.lock()?;

        let before = records.len();
        records.retain(|_, record| !record.is_expired_at(now));

        Ok((before - records.len()) as u64)
    }

    async fn health_check(&self) -> bool {
        !self.failing.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_record(code: &str, expires_in: chrono::Duration) -> NewUrlRecord {
        NewUrlRecord {
            short_code: code.to_string(),
            original_url: "https://example.com".to_string(),
            expired_at: Utc::now() + expires_in,
            is_custom: false,
        }
    }

    #[tokio::test]
    async fn test_create_marks_code_unavailable() {
        let repo = InMemoryUrlRepository::new();

        assert!(repo.is_short_code_available("abcd").await.unwrap());
        repo.create(new_record("abcd", chrono::Duration::hours(1)))
            .await
            .unwrap();

        assert!(!repo.is_short_code_available("abcd").await.unwrap());
        assert_eq!(repo.availability_checks(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let repo = InMemoryUrlRepository::new();
        repo.create(new_record("dup1", chrono::Duration::hours(1)))
            .await
            .unwrap();

        let result = repo
            .create(new_record("dup1", chrono::Duration::hours(1)))
            .await;

        assert!(matches!(
            result,
            Err(StoreError::AlreadyExists { code }) if code == "dup1"
        ));
    }

    #[tokio::test]
    async fn test_delete_expired_honours_clock() {
        let repo = InMemoryUrlRepository::new();
        repo.create(new_record("soon", chrono::Duration::hours(1)))
            .await
            .unwrap();
        repo.create(new_record("later", chrono::Duration::hours(48)))
            .await
            .unwrap();

        assert_eq!(repo.delete_expired().await.unwrap(), 0);

        repo.advance_clock(chrono::Duration::hours(2));

        assert_eq!(repo.delete_expired().await.unwrap(), 1);
        assert_eq!(repo.delete_expired().await.unwrap(), 0);
        assert!(repo.find_by_short_code("soon").await.unwrap().is_none());
        assert!(repo.find_by_short_code("later").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failing_store_reports_errors() {
        let repo = InMemoryUrlRepository::new();
        repo.set_failing(true);

        assert!(matches!(
            repo.find_by_short_code("any").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(!repo.health_check().await);
    }
}
