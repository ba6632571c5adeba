use async_trait::async_trait;
use jiff::Timestamp;
use snaplink_core::error::{Result, StorageError};
use snaplink_core::mapping::{NewMapping, UrlMapping};
use snaplink_core::repository::{ReadRepository, Repository};
use snaplink_core::shortcode::ShortCode;
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{MySqlPool, Row};
use tracing::debug;

/// DDL for the mapping table. Safe to run repeatedly.
pub const SCHEMA: &str = include_str!("../ddl/mysql/url_mappings.sql");

/// MySQL implementation of the repository contract.
///
/// Short code uniqueness is enforced by the `uk_url_mappings_short_code`
/// index (binary collation, so codes stay case-sensitive). Timestamps are
/// stored as unix microseconds. Deletes are hard deletes; `AUTO_INCREMENT`
/// never hands out a removed id again.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the mapping table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("url_mappings schema is in place");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    async fn fetch_by_code<'e, E>(executor: E, code: &ShortCode) -> Result<Option<UrlMapping>>
    where
        E: sqlx::Executor<'e, Database = sqlx::MySql>,
    {
        let row = sqlx::query(
            r#"
            SELECT id, url, short_code, access_count, created_at, updated_at
            FROM url_mappings
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(map_row).transpose()
    }
}

fn to_micros(ts: Timestamp) -> i64 {
    ts.as_microsecond()
}

/// Current time truncated to the microsecond precision the table stores.
fn now_micros() -> Result<Timestamp> {
    parse_timestamp("current", to_micros(Timestamp::now()))
}

fn parse_timestamp(column: &str, micros: i64) -> Result<Timestamp> {
    Timestamp::from_microsecond(micros).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{micros}': {e}"))
    })
}

fn map_row(row: &MySqlRow) -> Result<UrlMapping> {
    let id: u64 = row.try_get("id").map_err(map_sqlx_error)?;
    let url: String = row.try_get("url").map_err(map_sqlx_error)?;
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let count: Option<u64> = row.try_get("access_count").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let updated_at: i64 = row.try_get("updated_at").map_err(map_sqlx_error)?;

    Ok(UrlMapping {
        id,
        url,
        short_code: ShortCode::new_unchecked(short_code),
        count,
        created_at: parse_timestamp("created_at", created_at)?,
        updated_at: parse_timestamp("updated_at", updated_at)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        Self::fetch_by_code(&self.pool, code).await
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM url_mappings
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn create(&self, mapping: NewMapping) -> Result<UrlMapping> {
        let now = now_micros()?;

        let result = sqlx::query(
            r#"
            INSERT INTO url_mappings (url, short_code, access_count, created_at, updated_at)
            VALUES (?, ?, NULL, ?, ?)
            "#,
        )
        .bind(&mapping.url)
        .bind(mapping.short_code.as_str())
        .bind(to_micros(now))
        .bind(to_micros(now))
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(UrlMapping {
                id: done.last_insert_id(),
                url: mapping.url,
                short_code: mapping.short_code,
                count: None,
                created_at: now,
                updated_at: now,
            }),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(mapping.short_code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn update_url(&self, code: &ShortCode, url: &str) -> Result<Option<UrlMapping>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // GREATEST keeps updated_at strictly increasing if the clock stalls.
        let result = sqlx::query(
            r#"
            UPDATE url_mappings
            SET url = ?, updated_at = GREATEST(?, updated_at + 1)
            WHERE short_code = ?
            "#,
        )
        .bind(url)
        .bind(to_micros(Timestamp::now()))
        .bind(code.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Ok(None);
        }

        let updated = Self::fetch_by_code(&mut *tx, code).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(updated)
    }

    async fn increment_count(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            r#"
            UPDATE url_mappings
            SET access_count = COALESCE(access_count, 0) + 1
            WHERE short_code = ?
            "#,
        )
        .bind(code.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Ok(None);
        }

        let updated = Self::fetch_by_code(&mut *tx, code).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(updated)
    }

    async fn delete(&self, code: &ShortCode) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM url_mappings
            WHERE short_code = ?
            "#,
        )
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
