/// Tool for logging habit check-ins
///
/// A new check-in changes the input of every score from its day onward, so
/// logging one truncates the habit's score series at that day.

use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, Utc};
use crate::domain::{HabitEntry, HabitId, Score, Timestamp};
use crate::storage::HabitStorage;
use crate::tools::parse_date;
use crate::{ScoreTracker, TrackerError};

/// Parameters for logging a check-in
#[derive(Debug, Deserialize)]
pub struct LogCheckinParams {
    pub habit_id: i64,
    /// Optional `YYYY-MM-DD` date, defaults to today
    pub completed_at: Option<String>,
    pub value: Option<u32>,
    pub intensity: Option<u8>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogCheckinResponse {
    pub habit_id: HabitId,
    pub completed_at: NaiveDate,
    /// Today's score after the check-in, 0.0 to 1.0
    pub today_score: f64,
    pub message: String,
}

/// Record a check-in and drop the scores it makes stale
pub fn log_checkin(
    tracker: &ScoreTracker,
    params: LogCheckinParams,
) -> Result<LogCheckinResponse, TrackerError> {
    let habit_id = HabitId(params.habit_id);
    let mut scores = tracker.habit_scores(habit_id)?;

    let today = Utc::now().date_naive();
    let completed_at = parse_date(params.completed_at.as_deref(), today)?;

    let entry = HabitEntry::new(
        habit_id,
        completed_at,
        params.value,
        params.intensity,
        params.notes,
    )?;
    tracker.storage().create_entry(&entry)?;

    scores.invalidate_newer_than(Timestamp::from_date(completed_at))?;
    let today_value = scores.get_today_value()?;
    let today_score = today_value as f64 / Score::MAX_VALUE as f64;

    tracing::info!("Logged check-in for habit {} on {}", habit_id, completed_at);

    Ok(LogCheckinResponse {
        habit_id,
        completed_at,
        today_score,
        message: format!(
            "🔥 Logged '{}' for {}. Score today: {:.1}%",
            scores.habit().name,
            completed_at,
            today_score * 100.0
        ),
    })
}
