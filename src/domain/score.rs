/// Score value object
///
/// A score is the derived, per-day strength of a habit. Scores are computed
/// from the check-in history and cached in storage one row per day.

use serde::{Deserialize, Serialize};
use crate::domain::{HabitId, Timestamp};

/// Computed score of a habit on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    pub habit_id: HabitId,
    pub timestamp: Timestamp,
    /// Strength in `[0, Score::MAX_VALUE]`
    pub value: i64,
}

impl Score {
    /// Score of a habit that has been done on every scheduled day for a long time
    pub const MAX_VALUE: i64 = 1_000_000;

    pub fn new(habit_id: HabitId, timestamp: Timestamp, value: i64) -> Self {
        Self {
            habit_id,
            timestamp,
            value,
        }
    }

    /// Score as a fraction between 0.0 and 1.0
    pub fn percentage(&self) -> f64 {
        self.value as f64 / Self::MAX_VALUE as f64
    }
}
