use crate::error::Result;
use async_trait::async_trait;
use snaplink_core::{ShortCode, UrlMapping};

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a mapping for `url` under a freshly allocated short code.
    async fn shorten(&self, url: &str) -> Result<UrlMapping>;

    /// Resolves a short code to its mapping.
    async fn resolve(&self, code: &ShortCode) -> Result<UrlMapping>;

    /// Points an existing short code at a new URL.
    async fn update(&self, code: &ShortCode, url: &str) -> Result<UrlMapping>;

    /// Removes a mapping.
    async fn delete(&self, code: &ShortCode) -> Result<()>;

    /// Returns the mapping for statistics reporting. Never counts as an
    /// access.
    async fn stats(&self, code: &ShortCode) -> Result<UrlMapping>;

    /// Checks that the backing store is reachable.
    async fn health(&self) -> Result<()>;
}
