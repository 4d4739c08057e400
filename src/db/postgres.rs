use super::UrlRepository;
use crate::error::{AppError, AppResult};
use crate::models::{NewUrlMapping, UrlMapping};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, PgPool,
};
use std::str::FromStr;
use std::time::Duration;

/// Unique constraint on `url_mappings.short_code`
const SHORT_CODE_CONSTRAINT: &str = "url_mappings_short_code_key";

/// Unique index on `md5(url_mappings.original_url)`
const ORIGINAL_URL_CONSTRAINT: &str = "url_mappings_original_url_key";

/// PostgreSQL-backed mapping repository
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Create a new repository with a connection pool
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_seconds: u64,
    ) -> AppResult<Self> {
        let options = PgConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Configuration(format!("Invalid database URL: {}", e)))?
            .disable_statement_logging();

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_seconds))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Translate unique violations into the errors the mapping service acts on.
fn map_insert_error(e: sqlx::Error, mapping: &NewUrlMapping) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            match db.constraint() {
                Some(SHORT_CODE_CONSTRAINT) => {
                    return AppError::ShortCodeExists(mapping.short_code.clone())
                }
                Some(ORIGINAL_URL_CONSTRAINT) => {
                    return AppError::DuplicateUrl(mapping.original_url.clone())
                }
                _ => {}
            }
        }
    }

    AppError::Database(e)
}

#[async_trait]
impl UrlRepository for PgRepository {
    async fn insert(&self, mapping: NewUrlMapping) -> AppResult<UrlMapping> {
        sqlx::query_as::<_, UrlMapping>(
            r#"
            INSERT INTO url_mappings (original_url, short_code, created_at, updated_at, access_count)
            VALUES ($1, $2, $3, $3, 0)
            RETURNING *
            "#,
        )
        .bind(&mapping.original_url)
        .bind(&mapping.short_code)
        .bind(mapping.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &mapping))
    }

    async fn find_by_short_code(&self, short_code: &str) -> AppResult<Option<UrlMapping>> {
        let result = sqlx::query_as::<_, UrlMapping>(
            r#"
            SELECT * FROM url_mappings
            WHERE short_code = $1
            "#,
        )
        .bind(short_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn find_by_original_url(&self, original_url: &str) -> AppResult<Option<UrlMapping>> {
        let result = sqlx::query_as::<_, UrlMapping>(
            r#"
            SELECT * FROM url_mappings
            WHERE md5(original_url) = md5($1) AND original_url = $1
            "#,
        )
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn record_access(&self, short_code: &str) -> AppResult<Option<UrlMapping>> {
        let result = sqlx::query_as::<_, UrlMapping>(
            r#"
            UPDATE url_mappings
            SET access_count = access_count + 1
            WHERE short_code = $1
            RETURNING *
            "#,
        )
        .bind(short_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn update_original_url(
        &self,
        short_code: &str,
        original_url: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<UrlMapping>> {
        let result = sqlx::query_as::<_, UrlMapping>(
            r#"
            UPDATE url_mappings
            SET original_url = $1,
                updated_at = $2
            WHERE short_code = $3
            RETURNING *
            "#,
        )
        .bind(original_url)
        .bind(updated_at)
        .bind(short_code)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(e) => {
                let is_url_conflict = e
                    .as_database_error()
                    .map(|db| {
                        db.is_unique_violation() && db.constraint() == Some(ORIGINAL_URL_CONSTRAINT)
                    })
                    .unwrap_or(false);

                if is_url_conflict {
                    Err(AppError::DuplicateUrl(original_url.to_string()))
                } else {
                    Err(AppError::Database(e))
                }
            }
        }
    }

    async fn delete(&self, short_code: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM url_mappings WHERE short_code = $1
            "#,
        )
        .bind(short_code)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
