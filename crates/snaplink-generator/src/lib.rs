//! Short code generators.
//!
//! Generators are pure: they never consult storage. Uniqueness is decided
//! by the repository at insert time.

pub mod random;
pub mod seq;

pub use random::RandomGenerator;
pub use seq::SeqGenerator;

use snaplink_core::ShortCode;

/// Trait for generating candidate short codes.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Produces the next candidate code. Candidates may collide with codes
    /// that already exist.
    fn generate(&self) -> Self::Output;
}
