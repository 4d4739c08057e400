use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url as UrlParser;
use validator::Validate;

/// A short code to original URL mapping as stored and returned to callers
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMapping {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub access_count: i64,
}

/// A mapping about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlMapping {
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
}

impl NewUrlMapping {
    pub fn new(original_url: impl Into<String>, short_code: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            short_code: short_code.into(),
            created_at: Utc::now(),
        }
    }
}

/// Request body for creating or updating a short URL
#[derive(Debug, Deserialize, Validate)]
pub struct UrlRequest {
    #[validate(url(message = "Must be a valid URL"))]
    pub url: String,
}

/// Validate an absolute web URL and return it with surrounding whitespace removed.
///
/// Only `http` and `https` URLs with a host are accepted.
pub fn validate_web_url(raw: &str) -> AppResult<String> {
    let candidate = raw.trim();

    let request = UrlRequest {
        url: candidate.to_string(),
    };
    request
        .validate()
        .map_err(|_| AppError::InvalidUrl(format!("'{}' is not a valid URL", raw)))?;

    let parsed = UrlParser::parse(candidate)
        .map_err(|_| AppError::InvalidUrl(format!("'{}' is not a valid URL", raw)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::InvalidUrl(
            "URL must start with http:// or https://".to_string(),
        ));
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(request.url),
        _ => Err(AppError::InvalidUrl("URL must include a host".to_string())),
    }
}
