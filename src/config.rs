mod cors;
mod database;
mod server;
mod url;

pub use cors::CorsConfig;
pub use database::{DatabaseConfig, StorageBackend};
pub use server::ServerConfig;
pub use self::url::UrlConfig;

use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageBackend,
    /// Present whenever `storage` is `Postgres`
    pub database: Option<DatabaseConfig>,
    pub url: UrlConfig,
    pub cors: CorsConfig,
}

/// Read `key` through `lookup` and parse it, falling back to `default` when unset.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("Invalid {}", key))),
        None => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "SERVER_PORT", 3000)?,
            api_prefix: lookup("API_PREFIX").unwrap_or_default(),
            static_dir: lookup("STATIC_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", 16 * 1024)?,
        };

        let storage: StorageBackend = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse().map_err(AppError::Configuration)?,
            None => StorageBackend::Postgres,
        };

        let database = match storage {
            StorageBackend::Postgres => Some(DatabaseConfig {
                url: lookup("DATABASE_URL")
                    .ok_or_else(|| AppError::MissingEnvVar("DATABASE_URL".to_string()))?,
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
                min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", 1)?,
                acquire_timeout_seconds: parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECONDS", 30)?,
            }),
            StorageBackend::Memory => None,
        };

        let url = UrlConfig {
            short_code_length: parse_or(&lookup, "SHORT_CODE_LENGTH", 8)?,
            short_code_max_attempts: parse_or(&lookup, "SHORT_CODE_MAX_ATTEMPTS", 10)?,
        };

        // FRONTEND_URL names a single front-end origin
        let origins = lookup("ALLOWED_ORIGINS")
            .or_else(|| lookup("FRONTEND_URL"))
            .unwrap_or_else(|| "*".to_string());
        let cors = CorsConfig::parse(&origins);

        let config = Config {
            server,
            storage,
            database,
            url,
            cors,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> AppResult<()> {
        self.server.validate().map_err(AppError::Configuration)?;
        self.url.validate().map_err(AppError::Configuration)?;

        match (&self.storage, &self.database) {
            (StorageBackend::Postgres, Some(database)) => {
                database.validate().map_err(AppError::Configuration)?
            }
            (StorageBackend::Postgres, None) => {
                return Err(AppError::MissingEnvVar("DATABASE_URL".to_string()))
            }
            (StorageBackend::Memory, _) => {}
        }

        if self.cors.allowed_origins.is_empty() {
            return Err(AppError::Configuration(
                "ALLOWED_ORIGINS must list at least one origin".to_string(),
            ));
        }

        Ok(())
    }
}
