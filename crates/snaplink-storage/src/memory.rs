use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use snaplink_core::error::{Result, StorageError};
use snaplink_core::mapping::{next_update_time, NewMapping, UrlMapping};
use snaplink_core::repository::{ReadRepository, Repository};
use snaplink_core::shortcode::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory implementation of the repository contract using DashMap.
///
/// Uniqueness is enforced through the entry API, which holds the shard
/// lock for the key across the check and the insert. Ids come from a
/// counter that is never rewound, so deleted ids are not reused.
#[derive(Debug)]
pub struct InMemoryRepository {
    storage: DashMap<String, UrlMapping>,
    next_id: AtomicU64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of live mappings.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        Ok(self.storage.get(code.as_str()).map(|entry| entry.clone()))
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.contains_key(code.as_str()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create(&self, mapping: NewMapping) -> Result<UrlMapping> {
        match self.storage.entry(mapping.short_code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(mapping.short_code.to_string())),
            Entry::Vacant(vacant) => {
                let now = Timestamp::now();
                let record = UrlMapping {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    url: mapping.url,
                    short_code: mapping.short_code,
                    count: None,
                    created_at: now,
                    updated_at: now,
                };
                vacant.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn update_url(&self, code: &ShortCode, url: &str) -> Result<Option<UrlMapping>> {
        let Some(mut entry) = self.storage.get_mut(code.as_str()) else {
            return Ok(None);
        };

        let updated_at = next_update_time(entry.updated_at);
        entry.url = url.to_owned();
        entry.updated_at = updated_at;
        Ok(Some(entry.clone()))
    }

    async fn increment_count(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        let Some(mut entry) = self.storage.get_mut(code.as_str()) else {
            return Ok(None);
        };

        let count = entry.count.unwrap_or(0).saturating_add(1);
        entry.count = Some(count);
        Ok(Some(entry.clone()))
    }

    async fn delete(&self, code: &ShortCode) -> Result<u64> {
        Ok(self.storage.remove(code.as_str()).map_or(0, |_| 1))
    }
}
