use crate::error::Result;
use crate::mapping::{NewMapping, UrlMapping};
use crate::shortcode::ShortCode;
use async_trait::async_trait;

/// A read-only view of a repository.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the mapping for a given short code.
    /// Returns `None` if the code does not exist.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>>;

    /// Checks whether a short code is currently taken.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;

    /// Verifies the backend is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Durable CRUD over URL mappings.
///
/// Implementations must enforce short code uniqueness atomically: two
/// concurrent `create` calls with the same code must never both succeed.
#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new mapping, assigning its id and timestamps.
    /// Returns `Err(StorageError::Conflict)` if the code already exists.
    async fn create(&self, mapping: NewMapping) -> Result<UrlMapping>;

    /// Replaces the target URL and bumps `updated_at`.
    /// Returns `None` if the code does not exist.
    async fn update_url(&self, code: &ShortCode, url: &str) -> Result<Option<UrlMapping>>;

    /// Atomically adds one to the access counter, treating an unset counter
    /// as zero. Returns the updated mapping, or `None` if the code does not
    /// exist.
    async fn increment_count(&self, code: &ShortCode) -> Result<Option<UrlMapping>>;

    /// Removes the mapping for a given short code.
    /// Returns the number of removed rows; zero means it did not exist.
    async fn delete(&self, code: &ShortCode) -> Result<u64>;
}
