//! The URL mapping service: create, resolve, update and delete short links.

use crate::db::UrlRepository;
use crate::error::{AppError, AppResult};
use crate::models::{validate_web_url, NewUrlMapping, UrlMapping};
use crate::services::short_code::CodeGenerator;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a create call.
///
/// Shortening a URL that already has a mapping returns that mapping instead of
/// minting a second code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(UrlMapping),
    Existing(UrlMapping),
}

impl CreateOutcome {
    pub fn mapping(&self) -> &UrlMapping {
        match self {
            CreateOutcome::Created(mapping) | CreateOutcome::Existing(mapping) => mapping,
        }
    }

    pub fn into_mapping(self) -> UrlMapping {
        match self {
            CreateOutcome::Created(mapping) | CreateOutcome::Existing(mapping) => mapping,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}

/// Service owning every mutation of URL mappings.
///
/// Holds no state of its own between calls; storage and code generation are
/// injected.
#[derive(Clone)]
pub struct UrlService {
    repository: Arc<dyn UrlRepository>,
    generator: Arc<dyn CodeGenerator>,
    max_attempts: u32,
}

impl UrlService {
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        generator: Arc<dyn CodeGenerator>,
        max_attempts: u32,
    ) -> Self {
        Self {
            repository,
            generator,
            max_attempts,
        }
    }

    /// Storage handle, for health checks
    pub fn repository(&self) -> &Arc<dyn UrlRepository> {
        &self.repository
    }

    /// Shorten `original_url`, or return its existing mapping.
    ///
    /// # Errors
    ///
    /// - `AppError::InvalidUrl` if `original_url` is not an absolute http(s) URL
    /// - `AppError::ShortCodeGenerationFailed` if every generated code was taken
    pub async fn create(&self, original_url: &str) -> AppResult<CreateOutcome> {
        let original_url = validate_web_url(original_url)?;

        if let Some(existing) = self.repository.find_by_original_url(&original_url).await? {
            debug!(short_code = %existing.short_code, "URL already shortened");
            return Ok(CreateOutcome::Existing(existing));
        }

        for attempt in 1..=self.max_attempts {
            let short_code = self.generator.generate();
            let mapping = NewUrlMapping::new(original_url.clone(), short_code);

            match self.repository.insert(mapping).await {
                Ok(created) => {
                    info!(short_code = %created.short_code, "Created short URL");
                    return Ok(CreateOutcome::Created(created));
                }
                Err(AppError::ShortCodeExists(code)) => {
                    debug!(short_code = %code, attempt, "Short code collision, retrying");
                }
                Err(AppError::DuplicateUrl(_)) => {
                    // Another caller shortened the same URL first
                    if let Some(existing) =
                        self.repository.find_by_original_url(&original_url).await?
                    {
                        return Ok(CreateOutcome::Existing(existing));
                    }

                    // The URL index is keyed by hash, so a different URL sharing
                    // that hash (or a concurrent delete) leaves nothing to return
                    warn!(
                        original_url = %original_url,
                        "URL conflicted on insert but no mapping holds it"
                    );
                    return Err(AppError::Internal(format!(
                        "URL index conflict without a matching mapping for {}",
                        original_url
                    )));
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::ShortCodeGenerationFailed(self.max_attempts))
    }

    /// Look up a mapping and count the access.
    ///
    /// The returned record already includes this access.
    pub async fn fetch(&self, short_code: &str) -> AppResult<UrlMapping> {
        self.repository
            .record_access(short_code)
            .await?
            .ok_or_else(|| AppError::UrlNotFound(short_code.to_string()))
    }

    /// Point an existing short code at a new URL.
    pub async fn update(&self, short_code: &str, new_url: &str) -> AppResult<UrlMapping> {
        let new_url = validate_web_url(new_url)?;

        let updated = self
            .repository
            .update_original_url(short_code, &new_url, Utc::now())
            .await
            .map_err(|e| match e {
                AppError::DuplicateUrl(url) => AppError::InvalidUrl(format!(
                    "'{}' is already shortened by another code",
                    url
                )),
                other => other,
            })?
            .ok_or_else(|| AppError::UrlNotFound(short_code.to_string()))?;

        info!(short_code = %short_code, "Updated short URL");
        Ok(updated)
    }

    /// Permanently remove a mapping.
    pub async fn delete(&self, short_code: &str) -> AppResult<()> {
        if !self.repository.delete(short_code).await? {
            return Err(AppError::UrlNotFound(short_code.to_string()));
        }

        info!(short_code = %short_code, "Deleted short URL");
        Ok(())
    }

    /// Read a mapping without counting an access.
    pub async fn stats(&self, short_code: &str) -> AppResult<UrlMapping> {
        self.repository
            .find_by_short_code(short_code)
            .await?
            .ok_or_else(|| AppError::UrlNotFound(short_code.to_string()))
    }

    /// Count an access and return the URL to redirect to.
    pub async fn redirect(&self, short_code: &str) -> AppResult<String> {
        self.fetch(short_code)
            .await
            .map(|mapping| mapping.original_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryRepository, MockUrlRepository};
    use crate::services::short_code::MockCodeGenerator;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Hands out a fixed sequence of codes
    struct SequenceGenerator(Mutex<VecDeque<&'static str>>);

    impl SequenceGenerator {
        fn new(codes: &[&'static str]) -> Self {
            Self(Mutex::new(codes.iter().copied().collect()))
        }
    }

    impl CodeGenerator for SequenceGenerator {
        fn generate(&self) -> String {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .expect("sequence exhausted")
                .to_string()
        }
    }

    fn memory_service(codes: &[&'static str]) -> (UrlService, MemoryRepository) {
        let repo = MemoryRepository::new();
        let service = UrlService::new(
            Arc::new(repo.clone()),
            Arc::new(SequenceGenerator::new(codes)),
            10,
        );
        (service, repo)
    }

    fn mapping(short_code: &str, url: &str) -> UrlMapping {
        let now = Utc::now();
        UrlMapping {
            id: 1,
            original_url: url.to_string(),
            short_code: short_code.to_string(),
            created_at: now,
            updated_at: now,
            access_count: 0,
        }
    }

    #[tokio::test]
    async fn test_create_new_mapping() {
        let (service, _) = memory_service(&["abc123"]);

        let outcome = service.create("https://example.com/page").await.unwrap();
        assert!(outcome.is_created());

        let created = outcome.mapping();
        assert_eq!(created.short_code, "abc123");
        assert_eq!(created.original_url, "https://example.com/page");
        assert_eq!(created.access_count, 0);
    }

    #[tokio::test]
    async fn test_create_is_idempotent_by_url() {
        let (service, repo) = memory_service(&["abc123", "never01"]);

        let first = service.create("https://example.com/page").await.unwrap();
        let second = service.create("https://example.com/page").await.unwrap();

        assert!(first.is_created());
        assert!(!second.is_created());
        assert_eq!(first.mapping().short_code, second.mapping().short_code);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_urls_without_writing() {
        let (service, repo) = memory_service(&[]);

        for raw in ["not-a-url", "", "ftp://example.com"] {
            let result = service.create(raw).await;
            assert!(matches!(result, Err(AppError::InvalidUrl(_))));
        }
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_create_retries_on_collision() {
        let (service, _) = memory_service(&["taken01", "taken01", "fresh01"]);

        service.create("https://a.example.com").await.unwrap();
        let outcome = service.create("https://b.example.com").await.unwrap();

        assert!(outcome.is_created());
        assert_eq!(outcome.mapping().short_code, "fresh01");
    }

    #[tokio::test]
    async fn test_create_gives_up_after_max_attempts() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_insert()
            .times(3)
            .returning(|new| Err(AppError::ShortCodeExists(new.short_code)));

        let mut generator = MockCodeGenerator::new();
        generator
            .expect_generate()
            .times(3)
            .returning(|| "taken01".to_string());

        let service = UrlService::new(Arc::new(repo), Arc::new(generator), 3);
        let result = service.create("https://example.com").await;

        assert!(matches!(result, Err(AppError::ShortCodeGenerationFailed(3))));
    }

    #[tokio::test]
    async fn test_create_returns_winner_of_concurrent_insert() {
        let mut repo = MockUrlRepository::new();
        let mut lookups = 0;
        repo.expect_find_by_original_url()
            .times(2)
            .returning(move |url| {
                lookups += 1;
                if lookups == 1 {
                    Ok(None)
                } else {
                    Ok(Some(mapping("winner1", url)))
                }
            });
        repo.expect_insert()
            .times(1)
            .returning(|new| Err(AppError::DuplicateUrl(new.original_url)));

        let mut generator = MockCodeGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|| "loser01".to_string());

        let service = UrlService::new(Arc::new(repo), Arc::new(generator), 10);
        let outcome = service.create("https://example.com").await.unwrap();

        assert!(!outcome.is_created());
        assert_eq!(outcome.mapping().short_code, "winner1");
    }

    #[tokio::test]
    async fn test_create_reports_conflict_without_matching_mapping() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url()
            .times(2)
            .returning(|_| Ok(None));
        repo.expect_insert()
            .times(1)
            .returning(|new| Err(AppError::DuplicateUrl(new.original_url)));

        let mut generator = MockCodeGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|| "fresh01".to_string());

        let service = UrlService::new(Arc::new(repo), Arc::new(generator), 10);
        let result = service.create("https://example.com/hashed").await;

        assert!(
            matches!(result, Err(AppError::Internal(msg)) if msg.contains("https://example.com/hashed"))
        );
    }

    #[tokio::test]
    async fn test_create_propagates_storage_errors() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_original_url()
            .returning(|_| Err(AppError::Internal("storage down".to_string())));

        let service = UrlService::new(
            Arc::new(repo),
            Arc::new(SequenceGenerator::new(&[])),
            10,
        );
        let result = service.create("https://example.com").await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_access_counting() {
        let (service, _) = memory_service(&["abc123"]);
        service.create("https://example.com/page").await.unwrap();

        let fetched = service.fetch("abc123").await.unwrap();
        assert_eq!(fetched.access_count, 1);

        let stats = service.stats("abc123").await.unwrap();
        assert_eq!(stats.access_count, 1);

        let target = service.redirect("abc123").await.unwrap();
        assert_eq!(target, "https://example.com/page");

        let stats = service.stats("abc123").await.unwrap();
        assert_eq!(stats.access_count, 2);
    }

    #[tokio::test]
    async fn test_update_replaces_url_only() {
        let (service, _) = memory_service(&["abc123"]);
        let created = service
            .create("https://example.com/old")
            .await
            .unwrap()
            .into_mapping();
        service.fetch("abc123").await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = service
            .update("abc123", "https://example.com/new")
            .await
            .unwrap();

        assert_eq!(updated.original_url, "https://example.com/new");
        assert_eq!(updated.short_code, created.short_code);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.access_count, 1);
        assert!(updated.updated_at > updated.created_at);
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_url() {
        let (service, _) = memory_service(&["abc123"]);
        service.create("https://example.com/old").await.unwrap();

        let result = service.update("abc123", "not-a-url").await;
        assert!(matches!(result, Err(AppError::InvalidUrl(_))));

        let stats = service.stats("abc123").await.unwrap();
        assert_eq!(stats.original_url, "https://example.com/old");
    }

    #[tokio::test]
    async fn test_update_to_url_of_other_code_is_invalid() {
        let (service, _) = memory_service(&["aaaa1111", "bbbb2222"]);
        service.create("https://a.example.com").await.unwrap();
        service.create("https://b.example.com").await.unwrap();

        let result = service.update("aaaa1111", "https://b.example.com").await;
        assert!(matches!(result, Err(AppError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_delete_then_fetch_is_not_found() {
        let (service, _) = memory_service(&["abc123"]);
        service.create("https://example.com").await.unwrap();

        service.delete("abc123").await.unwrap();

        assert!(matches!(
            service.fetch("abc123").await,
            Err(AppError::UrlNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found_everywhere() {
        let (service, _) = memory_service(&[]);

        assert!(matches!(service.fetch("nope").await, Err(AppError::UrlNotFound(_))));
        assert!(matches!(
            service.update("nope", "https://example.com").await,
            Err(AppError::UrlNotFound(_))
        ));
        assert!(matches!(service.delete("nope").await, Err(AppError::UrlNotFound(_))));
        assert!(matches!(service.stats("nope").await, Err(AppError::UrlNotFound(_))));
        assert!(matches!(service.redirect("nope").await, Err(AppError::UrlNotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_fetches_are_all_counted() {
        const CALLERS: i64 = 64;

        let (service, _) = memory_service(&["abc123"]);
        service.create("https://example.com").await.unwrap();

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.fetch("abc123").await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stats = service.stats("abc123").await.unwrap();
        assert_eq!(stats.access_count, CALLERS);
    }
}
