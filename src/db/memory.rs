use super::UrlRepository;
use crate::error::{AppError, AppResult};
use crate::models::{NewUrlMapping, UrlMapping};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-process mapping repository.
///
/// Reads and access counting go straight to the sharded maps; inserts, URL
/// updates and deletes touch both indexes and are serialized by `write_lock`.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    by_code: DashMap<String, UrlMapping>,
    /// original_url -> short_code
    by_url: DashMap<String, String>,
    next_id: AtomicI64,
    write_lock: Mutex<()>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored mappings
    pub fn len(&self) -> usize {
        self.inner.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.by_code.is_empty()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, ()>> {
        self.inner
            .write_lock
            .lock()
            .map_err(|_| AppError::Internal("Memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UrlRepository for MemoryRepository {
    async fn insert(&self, mapping: NewUrlMapping) -> AppResult<UrlMapping> {
        let _guard = self.lock()?;

        if self.inner.by_code.contains_key(&mapping.short_code) {
            return Err(AppError::ShortCodeExists(mapping.short_code));
        }
        if self.inner.by_url.contains_key(&mapping.original_url) {
            return Err(AppError::DuplicateUrl(mapping.original_url));
        }

        let stored = UrlMapping {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            original_url: mapping.original_url,
            short_code: mapping.short_code,
            created_at: mapping.created_at,
            updated_at: mapping.created_at,
            access_count: 0,
        };

        self.inner
            .by_url
            .insert(stored.original_url.clone(), stored.short_code.clone());
        self.inner
            .by_code
            .insert(stored.short_code.clone(), stored.clone());

        Ok(stored)
    }

    async fn find_by_short_code(&self, short_code: &str) -> AppResult<Option<UrlMapping>> {
        Ok(self
            .inner
            .by_code
            .get(short_code)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_original_url(&self, original_url: &str) -> AppResult<Option<UrlMapping>> {
        let Some(short_code) = self
            .inner
            .by_url
            .get(original_url)
            .map(|entry| entry.value().clone())
        else {
            return Ok(None);
        };

        self.find_by_short_code(&short_code).await
    }

    async fn record_access(&self, short_code: &str) -> AppResult<Option<UrlMapping>> {
        // The shard lock held by get_mut makes the increment atomic
        Ok(self.inner.by_code.get_mut(short_code).map(|mut entry| {
            entry.access_count += 1;
            entry.value().clone()
        }))
    }

    async fn update_original_url(
        &self,
        short_code: &str,
        original_url: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<UrlMapping>> {
        let _guard = self.lock()?;

        if let Some(owner) = self.inner.by_url.get(original_url) {
            if owner.value() != short_code {
                return Err(AppError::DuplicateUrl(original_url.to_string()));
            }
        }

        let (previous_url, updated) = match self.inner.by_code.get_mut(short_code) {
            Some(mut entry) => {
                let previous =
                    std::mem::replace(&mut entry.original_url, original_url.to_string());
                entry.updated_at = updated_at;
                (previous, entry.value().clone())
            }
            None => return Ok(None),
        };

        if previous_url != original_url {
            self.inner.by_url.remove(&previous_url);
            self.inner
                .by_url
                .insert(original_url.to_string(), short_code.to_string());
        }

        Ok(Some(updated))
    }

    async fn delete(&self, short_code: &str) -> AppResult<bool> {
        let _guard = self.lock()?;

        match self.inner.by_code.remove(short_code) {
            Some((_, mapping)) => {
                self.inner.by_url.remove(&mapping.original_url);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
