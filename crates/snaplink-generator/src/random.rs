use crate::Generator;
use snaplink_core::shortcode::{ALPHABET, LENGTH};
use snaplink_core::ShortCode;
use typed_builder::TypedBuilder;

/// Generates uniformly random short codes.
///
/// Each code is [`LENGTH`] characters drawn from `alphabet`, which defaults
/// to the full short code alphabet (62 symbols, about 5.7e10 codes). A
/// narrower alphabet must be a subset of [`ALPHABET`]; it is only useful to
/// provoke collisions.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RandomGenerator {
    /// An empty alphabet is replaced by [`ALPHABET`].
    #[builder(
        default = ALPHABET,
        setter(transform = |alphabet: &'static [u8]| non_empty_or_default(alphabet))
    )]
    alphabet: &'static [u8],
}

fn non_empty_or_default(alphabet: &'static [u8]) -> &'static [u8] {
    if alphabet.is_empty() {
        ALPHABET
    } else {
        alphabet
    }
}

impl RandomGenerator {
    pub fn new() -> Self {
        Self::builder().build()
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let code: String = std::iter::repeat_with(|| {
            self.alphabet[rand::random_range(0..self.alphabet.len())] as char
        })
        .take(LENGTH)
        .collect();
        ShortCode::new_unchecked(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_have_fixed_length_and_valid_characters() {
        let generator = RandomGenerator::new();
        for _ in 0..1_000 {
            let code = generator.generate();
            assert_eq!(code.as_str().len(), LENGTH);
            assert!(ShortCode::new(code.as_str()).is_ok());
        }
    }

    #[test]
    fn codes_are_distinct_in_practice() {
        let generator = RandomGenerator::new();
        let codes: HashSet<_> = (0..1_000).map(|_| generator.generate()).collect();
        // birthday bound for 1000 draws over 62^6 codes is about 1e-5
        assert_eq!(codes.len(), 1_000);
    }

    #[test]
    fn narrow_alphabet() {
        let generator = RandomGenerator::builder().alphabet(b"xy").build();
        for _ in 0..100 {
            let code = generator.generate();
            assert!(code.as_str().bytes().all(|b| b == b'x' || b == b'y'));
        }
    }

    #[test]
    fn empty_alphabet_falls_back_to_default() {
        let generator = RandomGenerator::builder().alphabet(b"").build();
        for _ in 0..100 {
            assert!(ShortCode::new(generator.generate().as_str()).is_ok());
        }
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}
