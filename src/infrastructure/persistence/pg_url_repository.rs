//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{StoreError, UrlRepository};
use crate::utils::db_error::is_unique_violation_on_code;

#[derive(sqlx::FromRow)]
struct UrlRow {
    id: i64,
    short_code: String,
    original_url: String,
    is_custom: bool,
    created_at: DateTime<Utc>,
    expired_at: DateTime<Utc>,
}

impl From<UrlRow> for UrlRecord {
    fn from(row: UrlRow) -> Self {
        UrlRecord::new(
            row.id,
            row.short_code,
            row.original_url,
            row.is_custom,
            row.created_at,
            row.expired_at,
        )
    }
}

/// PostgreSQL repository for URL records.
///
/// Uniqueness is enforced by the `urls_short_code_key` constraint, so concurrent
/// inserts of the same code surface as [`StoreError::AlreadyExists`].
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn is_short_code_available(&self, code: &str) -> Result<bool, StoreError> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM urls WHERE short_code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(!taken)
    }

    async fn create(&self, new_record: NewUrlRecord) -> Result<UrlRecord, StoreError> {
        let result = sqlx::query_as::<_, UrlRow>(
            r#"
            INSERT INTO urls (short_code, original_url, is_custom, expired_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, short_code, original_url, is_custom, created_at, expired_at
            "#,
        )
        .bind(&new_record.short_code)
        .bind(&new_record.original_url)
        .bind(new_record.is_custom)
        .bind(new_record.expired_at)
        .fetch_one(self.pool.as_ref())
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(e) if is_unique_violation_on_code(&e) => Err(StoreError::AlreadyExists {
                code: new_record.short_code,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_short_code(&self, code: &str) -> Result<Option<UrlRecord>, StoreError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, short_code, original_url, is_custom, created_at, expired_at
            FROM urls
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM urls WHERE expired_at <= NOW()")
            .execute(self.pool.as_ref())
            .await?;

        debug!("Deleted {} expired rows", result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
