/// Score computation engine
///
/// Turns a habit's check-in history into a per-day score series. The score
/// list decides *which* days are missing and asks a `ScoreComputer` to fill
/// them; the computer never touches storage itself.

use std::collections::HashSet;

use chrono::NaiveDate;
use crate::domain::{Habit, HabitEntry, HabitId, Score, Timestamp};

/// Computes scores for a contiguous run of days
pub trait ScoreComputer {
    /// Compute one score per day in `[from, to]`, oldest first
    ///
    /// `previous` is the score of the day before `from` (0 when the run starts
    /// a fresh series). `entries` holds the habit's check-ins within the run.
    fn compute(
        &self,
        habit: &Habit,
        habit_id: HabitId,
        entries: &[HabitEntry],
        from: Timestamp,
        to: Timestamp,
        previous: i64,
    ) -> Vec<Score>;
}

/// Default engine: exponential smoothing of daily check-ins
///
/// Each day the previous score decays by a multiplier derived from the habit's
/// frequency, and a check-in adds the remaining share of `Score::MAX_VALUE`.
/// Less frequent habits decay more slowly so a skipped day costs them less.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreEngine;

impl ScoreEngine {
    pub fn new() -> Self {
        Self
    }

    /// Daily decay factor for a habit performed `per_day` times per day
    pub fn multiplier(per_day: f64) -> f64 {
        0.5f64.powf(per_day.sqrt() / 13.0)
    }

    /// Score of one day given the previous day's score
    pub fn next_value(multiplier: f64, previous: i64, checked: bool) -> i64 {
        let mut value = previous as f64 * multiplier;
        if checked {
            value += Score::MAX_VALUE as f64 * (1.0 - multiplier);
        }
        (value.round() as i64).clamp(0, Score::MAX_VALUE)
    }
}

impl ScoreComputer for ScoreEngine {
    fn compute(
        &self,
        habit: &Habit,
        habit_id: HabitId,
        entries: &[HabitEntry],
        from: Timestamp,
        to: Timestamp,
        previous: i64,
    ) -> Vec<Score> {
        if from > to {
            return Vec::new();
        }

        let checked: HashSet<NaiveDate> = entries.iter().map(|e| e.completed_at).collect();
        let multiplier = Self::multiplier(habit.frequency.per_day());

        let days = from.days_until(to);
        let mut scores = Vec::with_capacity(days as usize + 1);
        let mut value = previous;

        for offset in 0..=days {
            let day = from.plus_days(offset);
            value = Self::next_value(multiplier, value, checked.contains(&day.date()));
            scores.push(Score::new(habit_id, day, value));
        }

        tracing::debug!(
            "Computed {} scores for habit {} ({} to {})",
            scores.len(), habit_id, from, to
        );
        scores
    }
}
