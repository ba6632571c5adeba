use crate::Generator;
use snaplink_core::shortcode::{ALPHABET, LENGTH};
use snaplink_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of distinct codes of [`LENGTH`] characters.
const SPACE: u64 = (ALPHABET.len() as u64).pow(LENGTH as u32);

/// A deterministic generator that walks the code space in order.
///
/// Produces `AAAAAA`, `AAAAAB`, ... by base-62 encoding a counter over the
/// short code alphabet. The counter wraps once the space is exhausted.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
}

impl SeqGenerator {
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Creates a generator whose first code encodes `offset`.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }
}

impl Default for SeqGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self::with_offset(self.counter.load(Ordering::SeqCst))
    }
}

fn encode(mut value: u64) -> String {
    let base = ALPHABET.len() as u64;
    let mut buf = [ALPHABET[0]; LENGTH];
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(value % base) as usize];
        value /= base;
    }
    buf.iter().map(|&b| b as char).collect()
}

impl Generator for SeqGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let count = self.counter.fetch_add(1, Ordering::SeqCst) % SPACE;
        ShortCode::new_unchecked(encode(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_sequential_codes() {
        let generator = SeqGenerator::new();

        assert_eq!(generator.generate().as_str(), "AAAAAA");
        assert_eq!(generator.generate().as_str(), "AAAAAB");
        assert_eq!(generator.generate().as_str(), "AAAAAC");
    }

    #[test]
    fn with_offset() {
        let generator = SeqGenerator::with_offset(62);

        assert_eq!(generator.generate().as_str(), "AAAABA");
        assert_eq!(generator.generate().as_str(), "AAAABB");
    }

    #[test]
    fn wraps_at_end_of_space() {
        let generator = SeqGenerator::with_offset(SPACE - 1);

        assert_eq!(generator.generate().as_str(), "999999");
        assert_eq!(generator.generate().as_str(), "AAAAAA");
    }

    #[test]
    fn generated_codes_pass_validation() {
        let generator = SeqGenerator::with_offset(123_456_789);
        for _ in 0..100 {
            let code = generator.generate();
            assert!(ShortCode::new(code.as_str()).is_ok());
        }
    }

    #[test]
    fn clone_preserves_counter_state() {
        let generator = SeqGenerator::new();
        generator.generate();
        generator.generate();

        let cloned = generator.clone();

        assert_eq!(generator.generate().as_str(), "AAAAAC");
        assert_eq!(cloned.generate().as_str(), "AAAAAC");
    }
}
