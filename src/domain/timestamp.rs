/// Day-aligned timestamps and the clock used to decide what "today" is
///
/// Scores are keyed by midnight UTC expressed in milliseconds since the Unix
/// epoch. Keeping every key on a day boundary makes equality lookups exact.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds in one day
pub const DAY_LENGTH_MS: i64 = 86_400_000;

/// A day-aligned instant (UTC midnight, epoch milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Truncate an arbitrary epoch-millisecond instant to its day boundary
    pub fn start_of_day(millis: i64) -> Self {
        Self(millis - millis.rem_euclid(DAY_LENGTH_MS))
    }

    /// Build from raw milliseconds that are already day-aligned (database rows)
    pub fn from_millis(millis: i64) -> Self {
        Self::start_of_day(millis)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
    }

    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self::start_of_day(instant.timestamp_millis())
    }

    pub fn millis(&self) -> i64 {
        self.0
    }

    /// Calendar date this timestamp starts
    pub fn date(&self) -> NaiveDate {
        DateTime::<Utc>::from_timestamp_millis(self.0)
            .map(|dt| dt.date_naive())
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn plus_days(&self, days: i64) -> Self {
        Self(self.0.saturating_add(days.saturating_mul(DAY_LENGTH_MS)))
    }

    pub fn minus_days(&self, days: i64) -> Self {
        Self(self.0.saturating_sub(days.saturating_mul(DAY_LENGTH_MS)))
    }

    /// Number of whole days from `self` to `other` (negative if `other` is earlier)
    pub fn days_until(&self, other: Timestamp) -> i64 {
        (other.0 - self.0) / DAY_LENGTH_MS
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.date(), f)
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

/// Source of the current day boundary
///
/// The today-value cache expires when this value moves, so tests substitute a
/// clock they can advance by hand.
pub trait Clock {
    fn today(&self) -> Timestamp;
}

/// Wall clock in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Timestamp {
        Timestamp::from_datetime(Utc::now())
    }
}
