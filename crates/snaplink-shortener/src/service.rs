use crate::allocator::{Allocator, DEFAULT_MAX_ATTEMPTS};
use crate::error::{Result, ShortenerError};
use crate::shortener::Shortener;
use async_trait::async_trait;
use snaplink_core::{Repository, ShortCode, UrlMapping};
use snaplink_generator::Generator;
use std::sync::Arc;
use tracing::{debug, instrument, trace};
use typed_builder::TypedBuilder;

/// Tunables for [`ShortenerService`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// Upper bound on allocation attempts per created mapping.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    /// Whether a successful resolution increments the access counter.
    #[builder(default = false)]
    pub count_resolutions: bool,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A concrete implementation of the [`Shortener`] trait.
///
/// Wraps a [`Repository`] and an [`Allocator`] drawing codes from `G`. The
/// repository handle is shared with the allocator; the service keeps no
/// other state between requests.
#[derive(Debug)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    allocator: Allocator<R, G>,
    count_resolutions: bool,
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    pub fn new(repository: R, generator: G, settings: ShortenerSettings) -> Self {
        Self::with_shared_repository(Arc::new(repository), generator, settings)
    }

    /// Creates a service over a repository handle the caller keeps a clone of.
    pub fn with_shared_repository(
        repository: Arc<R>,
        generator: G,
        settings: ShortenerSettings,
    ) -> Self {
        Self {
            allocator: Allocator::new(Arc::clone(&repository), generator, settings.max_attempts),
            repository,
            count_resolutions: settings.count_resolutions,
        }
    }

    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    async fn find(&self, code: &ShortCode) -> Result<UrlMapping> {
        self.repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| ShortenerError::NotFound(code.to_string()))
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    #[instrument(skip(self, url))]
    async fn shorten(&self, url: &str) -> Result<UrlMapping> {
        Self::validate_url(url)?;
        self.allocator.allocate(url).await
    }

    #[instrument(skip(self, code), fields(code = %code))]
    async fn resolve(&self, code: &ShortCode) -> Result<UrlMapping> {
        let mapping = if self.count_resolutions {
            self.repository
                .increment_count(code)
                .await?
                .ok_or_else(|| ShortenerError::NotFound(code.to_string()))?
        } else {
            self.find(code).await?
        };

        debug!(url = %mapping.url, "resolved short code");
        Ok(mapping)
    }

    #[instrument(skip(self, code, url), fields(code = %code))]
    async fn update(&self, code: &ShortCode, url: &str) -> Result<UrlMapping> {
        Self::validate_url(url)?;

        let mapping = self
            .repository
            .update_url(code, url)
            .await?
            .ok_or_else(|| ShortenerError::NotFound(code.to_string()))?;

        debug!(url = %mapping.url, "updated short code target");
        Ok(mapping)
    }

    #[instrument(skip(self, code), fields(code = %code))]
    async fn delete(&self, code: &ShortCode) -> Result<()> {
        match self.repository.delete(code).await? {
            0 => Err(ShortenerError::NotFound(code.to_string())),
            _ => {
                debug!("deleted short code");
                Ok(())
            }
        }
    }

    #[instrument(skip(self, code), fields(code = %code))]
    async fn stats(&self, code: &ShortCode) -> Result<UrlMapping> {
        self.find(code).await
    }

    async fn health(&self) -> Result<()> {
        trace!("checking repository health");
        self.repository.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaplink_generator::{RandomGenerator, SeqGenerator};
    use snaplink_storage::InMemoryRepository;
    use std::collections::HashSet;

    fn test_service() -> ShortenerService<InMemoryRepository, SeqGenerator> {
        ShortenerService::new(
            InMemoryRepository::new(),
            SeqGenerator::new(),
            ShortenerSettings::default(),
        )
    }

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn shorten_assigns_six_character_code() {
        let service = test_service();

        let mapping = service.shorten("https://example.com").await.unwrap();
        assert_eq!(mapping.short_code.as_str().len(), 6);
        assert_eq!(mapping.url, "https://example.com");
        assert_eq!(mapping.count, None);
    }

    #[tokio::test]
    async fn shorten_with_empty_url_fails() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = ShortenerService::with_shared_repository(
            Arc::clone(&repo),
            SeqGenerator::new(),
            ShortenerSettings::default(),
        );

        let err = service.shorten("").await.unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidUrl(_)));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn shorten_accepts_arbitrary_text() {
        let service = test_service();

        let mapping = service.shorten("not a url at all").await.unwrap();
        assert_eq!(mapping.url, "not a url at all");
    }

    #[tokio::test]
    async fn resolve_existing_and_missing() {
        let service = test_service();
        let created = service.shorten("https://example.com").await.unwrap();

        let resolved = service.resolve(&created.short_code).await.unwrap();
        assert_eq!(resolved.url, "https://example.com");
        assert_eq!(resolved.count, None);

        let err = service.resolve(&code("zzzzzz")).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));
    }

    #[tokio::test]
    async fn resolve_counts_accesses_when_enabled() {
        let service = ShortenerService::new(
            InMemoryRepository::new(),
            SeqGenerator::new(),
            ShortenerSettings::builder().count_resolutions(true).build(),
        );
        let created = service.shorten("https://example.com").await.unwrap();

        service.resolve(&created.short_code).await.unwrap();
        let second = service.resolve(&created.short_code).await.unwrap();
        assert_eq!(second.count, Some(2));

        let stats = service.stats(&created.short_code).await.unwrap();
        assert_eq!(stats.access_count(), 2);

        let err = service.resolve(&code("zzzzzz")).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_changes_url_only() {
        let service = test_service();
        let created = service.shorten("https://example.com").await.unwrap();

        let updated = service
            .update(&created.short_code, "https://changed.example")
            .await
            .unwrap();

        assert_eq!(updated.url, "https://changed.example");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.short_code, created.short_code);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_missing_or_empty() {
        let service = test_service();
        let created = service.shorten("https://example.com").await.unwrap();

        let err = service
            .update(&code("zzzzzz"), "https://changed.example")
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));

        let err = service.update(&created.short_code, "").await.unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn delete_then_delete_again() {
        let service = test_service();
        let created = service.shorten("https://example.com").await.unwrap();

        service.delete(&created.short_code).await.unwrap();

        let err = service.resolve(&created.short_code).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));

        let err = service.delete(&created.short_code).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));
    }

    #[tokio::test]
    async fn stats_does_not_count() {
        let service = ShortenerService::new(
            InMemoryRepository::new(),
            SeqGenerator::new(),
            ShortenerSettings::builder().count_resolutions(true).build(),
        );
        let created = service.shorten("https://example.com").await.unwrap();

        service.stats(&created.short_code).await.unwrap();
        let stats = service.stats(&created.short_code).await.unwrap();
        assert_eq!(stats.count, None);
        assert_eq!(stats.access_count(), 0);
    }

    #[tokio::test]
    async fn concurrent_shortening_yields_unique_codes() {
        let service = Arc::new(ShortenerService::new(
            InMemoryRepository::new(),
            RandomGenerator::new(),
            ShortenerSettings::default(),
        ));

        let mut handles = vec![];
        for i in 0..100 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .shorten(&format!("https://example.com/{i}"))
                    .await
                    .unwrap()
            }));
        }

        let mut codes = HashSet::new();
        let mut ids = HashSet::new();
        for handle in handles {
            let mapping = handle.await.unwrap();
            codes.insert(mapping.short_code);
            ids.insert(mapping.id);
        }
        assert_eq!(codes.len(), 100);
        assert_eq!(ids.len(), 100);
    }

    #[tokio::test]
    async fn health_is_ok_for_memory_store() {
        assert!(test_service().health().await.is_ok());
    }
}
