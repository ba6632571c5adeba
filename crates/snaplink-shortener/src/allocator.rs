use crate::error::{Result, ShortenerError};
use snaplink_core::{NewMapping, Repository, ShortCode, StorageError, UrlMapping};
use snaplink_generator::Generator;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default bound on generate-and-insert rounds for a single allocation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Allocates unique short codes and creates the mapping in one step.
///
/// Each attempt draws a candidate from the generator, skips it if the
/// repository already knows it, and otherwise inserts. The pre-check only
/// saves a round trip; the repository's uniqueness constraint decides, and
/// a [`StorageError::Conflict`] on insert simply starts the next attempt.
/// No lock is taken, so any number of allocations may run concurrently,
/// including from other processes sharing the same store.
#[derive(Debug)]
pub struct Allocator<R, G> {
    repository: Arc<R>,
    generator: G,
    max_attempts: u32,
}

impl<R: Repository, G: Generator> Allocator<R, G> {
    /// Creates an allocator. `max_attempts` is clamped to at least one.
    pub fn new(repository: Arc<R>, generator: G, max_attempts: u32) -> Self {
        Self {
            repository,
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Creates a mapping for `url` under a code no other mapping holds.
    ///
    /// Fails with [`ShortenerError::AllocationExhausted`] once every attempt
    /// has collided. Storage failures other than a conflict abort at once.
    pub async fn allocate(&self, url: &str) -> Result<UrlMapping> {
        for attempt in 1..=self.max_attempts {
            let code: ShortCode = self.generator.generate().into();

            if self.repository.exists(&code).await? {
                debug!(code = %code, attempt, "candidate short code already taken");
                continue;
            }

            let mapping = NewMapping {
                url: url.to_owned(),
                short_code: code,
            };

            match self.repository.create(mapping).await {
                Ok(created) => {
                    debug!(code = %created.short_code, id = created.id, attempt, "allocated short code");
                    return Ok(created);
                }
                Err(StorageError::Conflict(code)) => {
                    warn!(code = %code, attempt, "short code claimed concurrently, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ShortenerError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }
}
