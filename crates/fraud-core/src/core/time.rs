// fraud-core/src/core/time.rs
// ============================================================================
// Module: Timestamp
// Description: Monotonic-ordering-friendly wall-clock timestamp.
// Purpose: Single canonical time representation across the pipeline.
// Dependencies: time, serde
// ============================================================================

//! ## Overview
//! All event, feature, score, decision, and evidence timestamps flow through
//! this single type so ordering comparisons (`non-decreasing timestamp order
//! within a partition`, §3) and the date-sharded object-store path (`§4.5`)
//! use one consistent clock representation.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Wall-clock timestamp, serialized as RFC 3339 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(#[serde(with = "time::serde::rfc3339")] OffsetDateTime);

impl Timestamp {
    /// Returns the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Wraps an existing `OffsetDateTime`.
    #[must_use]
    pub const fn from_offset_date_time(value: OffsetDateTime) -> Self {
        Self(value)
    }

    /// Returns the underlying `OffsetDateTime`.
    #[must_use]
    pub const fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    /// Returns the year, used for the `YYYY/MM/DD` object-store key prefix (§4.5).
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Returns the two-digit month, used for the object-store key prefix.
    #[must_use]
    pub fn month(self) -> u8 {
        u8::from(self.0.month())
    }

    /// Returns the two-digit day, used for the object-store key prefix.
    #[must_use]
    pub fn day(self) -> u8 {
        self.0.day()
    }

    /// Returns the difference between `self` and `earlier` in whole seconds,
    /// saturating at zero when `earlier` is not actually earlier.
    #[must_use]
    pub fn seconds_since(self, earlier: Self) -> f64 {
        let delta = self.0 - earlier.0;
        delta.as_seconds_f64().max(0.0)
    }

    /// Formats the `YYYY/MM/DD` object-store key prefix.
    #[must_use]
    pub fn date_prefix(self) -> String {
        format!("{:04}/{:02}/{:02}", self.year(), self.month(), self.day())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.format(&Rfc3339).map_err(|_| fmt::Error).and_then(|s| f.write_str(&s))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn date_prefix_is_zero_padded() {
        let ts = Timestamp::from_offset_date_time(datetime!(2024-03-05 12:00:00 UTC));
        assert_eq!(ts.date_prefix(), "2024/03/05");
    }

    #[test]
    fn ordering_matches_wall_clock_order() {
        let earlier = Timestamp::from_offset_date_time(datetime!(2024-01-01 00:00:00 UTC));
        let later = Timestamp::from_offset_date_time(datetime!(2024-01-02 00:00:00 UTC));
        assert!(earlier < later);
        assert_eq!(later.seconds_since(earlier), 86400.0);
    }
}
