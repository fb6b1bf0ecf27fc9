use async_trait::async_trait;
use burrow_core::error::StorageError;
use burrow_core::repository::{HitRecorder, ReadRepository, Repository, Result, UrlRecord};
use burrow_core::sequence::SequenceStore;
use burrow_core::shortcode::ShortCode;
use jiff::Timestamp;
use sqlx::migrate::Migrator;
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{MySqlPool, Row};
use tracing::{debug, info};

static MIGRATOR: Migrator = sqlx::migrate!();

/// Opens a MySQL connection pool.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<MySqlPool> {
    MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(map_sqlx_error)
}

/// Applies the bundled schema migrations.
///
/// Creates `short_urls`, whose primary key enforces short code uniqueness, and
/// `sequence_counters`. Safe to run on every start.
pub async fn migrate(pool: &MySqlPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| StorageError::Operation(format!("migration failed: {e}")))?;
    info!("mysql schema is up to date");
    Ok(())
}

/// MySQL implementation of the repository contract.
///
/// Timestamps are stored as Unix milliseconds. Codes are compared
/// byte-for-byte (`ascii_bin`), so `Promo` and `promo` are distinct records.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn to_timestamp(millis: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(millis).map_err(|e| {
        StorageError::InvalidData(format!("invalid timestamp '{millis}': {e}"))
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

fn record_from_row(code: &ShortCode, row: &MySqlRow) -> Result<UrlRecord> {
    let long_url: String = row.try_get("long_url").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let clicks: u64 = row.try_get("clicks").map_err(map_sqlx_error)?;
    let last_accessed: Option<i64> = row.try_get("last_accessed").map_err(map_sqlx_error)?;

    Ok(UrlRecord {
        short_code: code.clone(),
        long_url,
        created_at: to_timestamp(created_at)?,
        clicks,
        last_accessed: last_accessed.map(to_timestamp).transpose()?,
    })
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let row = sqlx::query(
            r#"
            SELECT long_url, created_at, clicks, last_accessed
            FROM short_urls
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|row| record_from_row(code, &row)).transpose()
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM short_urls
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
}

#[async_trait]
impl HitRecorder for MySqlRepository {
    async fn record_hit(&self, code: &ShortCode, at: Timestamp) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE short_urls
            SET clicks = clicks + 1, last_accessed = ?
            WHERE short_code = ?
            "#,
        )
        .bind(at.as_millisecond())
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert(&self, record: &UrlRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO short_urls (short_code, long_url, created_at, clicks, last_accessed)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.short_code.as_str())
        .bind(record.long_url.as_str())
        .bind(record.created_at.as_millisecond())
        .bind(record.clicks)
        .bind(record.last_accessed.map(|ts| ts.as_millisecond()))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                debug!(code = %record.short_code, "short code already taken");
                Err(StorageError::Conflict(record.short_code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }
}

/// Named counters kept in the `sequence_counters` table.
///
/// The increment is a single upsert, so concurrent callers on any number of
/// instances never observe the same value.
#[derive(Debug, Clone)]
pub struct MySqlSequenceStore {
    pool: MySqlPool,
}

impl MySqlSequenceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceStore for MySqlSequenceStore {
    async fn increment(&self, name: &str) -> Result<u64> {
        // LAST_INSERT_ID is per connection; both statements must share one.
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO sequence_counters (name, value)
            VALUES (?, LAST_INSERT_ID(1))
            ON DUPLICATE KEY UPDATE value = LAST_INSERT_ID(value + 1)
            "#,
        )
        .bind(name)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

        let value: u64 = sqlx::query_scalar("SELECT LAST_INSERT_ID()")
            .fetch_one(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;

        Ok(value)
    }
}
