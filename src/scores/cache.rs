use crate::domain::Timestamp;

/// Memoized score of the current day
///
/// Valid only while the day it was computed on is still "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodayCache {
    value: i64,
    day: Timestamp,
}

impl TodayCache {
    pub fn new(value: i64, day: Timestamp) -> Self {
        Self { value, day }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn day(&self) -> Timestamp {
        self.day
    }

    /// True once the day boundary has moved past the cached day
    pub fn expired(&self, today: Timestamp) -> bool {
        self.day != today
    }
}
