use crate::shortcode::ShortCode;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

/// A persisted mapping from a short code to its target URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlMapping {
    /// Surrogate identifier assigned by the store. Never reused.
    pub id: u64,
    /// The original URL that was shortened.
    pub url: String,
    /// The unique short code.
    pub short_code: ShortCode,
    /// Access counter, `None` until it is first set.
    pub count: Option<u64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UrlMapping {
    /// Access count with an unset counter reported as zero.
    pub fn access_count(&self) -> u64 {
        self.count.unwrap_or(0)
    }
}

/// The caller-supplied part of a mapping; the store fills in the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMapping {
    pub url: String,
    pub short_code: ShortCode,
}

/// Returns the timestamp to record for a mutation of a row last touched at
/// `previous`.
///
/// The result is strictly later than `previous` even when the clock has not
/// advanced (or went backwards) between the two writes.
pub fn next_update_time(previous: Timestamp) -> Timestamp {
    let now = Timestamp::now();
    if now > previous {
        return now;
    }
    previous
        .checked_add(SignedDuration::from_micros(1))
        .unwrap_or(previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_update_time_moves_forward_from_the_past() {
        let past = Timestamp::now() - SignedDuration::from_secs(60);
        assert!(next_update_time(past) > past);
    }

    #[test]
    fn next_update_time_moves_forward_from_the_future() {
        let future = Timestamp::now() + SignedDuration::from_hours(1);
        let next = next_update_time(future);
        assert_eq!(next, future + SignedDuration::from_micros(1));
    }

    #[test]
    fn access_count_defaults_to_zero() {
        let now = Timestamp::now();
        let mut mapping = UrlMapping {
            id: 1,
            url: "https://example.com".to_string(),
            short_code: ShortCode::new_unchecked("abc123"),
            count: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(mapping.access_count(), 0);

        mapping.count = Some(7);
        assert_eq!(mapping.access_count(), 7);
    }
}
