//! Storage boundary for URL mappings.
//!
//! The mapping service only talks to storage through [`UrlRepository`], so a
//! PostgreSQL pool, an in-memory map, or a test double can be injected.

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use crate::error::AppResult;
use crate::models::{NewUrlMapping, UrlMapping};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistent store of URL mappings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Insert a new mapping with an access count of zero.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ShortCodeExists` if the short code is taken and
    /// `AppError::DuplicateUrl` if the original URL already has a mapping.
    async fn insert(&self, mapping: NewUrlMapping) -> AppResult<UrlMapping>;

    /// Get a mapping by short code
    async fn find_by_short_code(&self, short_code: &str) -> AppResult<Option<UrlMapping>>;

    /// Get a mapping by original URL
    async fn find_by_original_url(&self, original_url: &str) -> AppResult<Option<UrlMapping>>;

    /// Atomically increment the access count and return the updated mapping.
    ///
    /// Concurrent calls for the same short code must each be counted.
    async fn record_access(&self, short_code: &str) -> AppResult<Option<UrlMapping>>;

    /// Replace the original URL and refresh `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::DuplicateUrl` if another mapping already holds `original_url`.
    async fn update_original_url(
        &self,
        short_code: &str,
        original_url: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<UrlMapping>>;

    /// Delete a mapping, returning whether a row was removed
    async fn delete(&self, short_code: &str) -> AppResult<bool>;

    /// Check that the store is reachable
    async fn ping(&self) -> AppResult<()>;
}
