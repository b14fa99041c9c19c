/// Tool for discarding cached scores so they are recomputed on next read

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::domain::{HabitId, Timestamp};
use crate::tools::parse_date;
use crate::{ScoreTracker, TrackerError};

#[derive(Debug, Deserialize)]
pub struct InvalidateParams {
    pub habit_id: i64,
    /// `YYYY-MM-DD`; every score on or after this day is dropped
    pub from: String,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub habit_id: HabitId,
    pub from: NaiveDate,
    pub message: String,
}

pub fn invalidate_scores(
    tracker: &ScoreTracker,
    params: InvalidateParams,
) -> Result<InvalidateResponse, TrackerError> {
    let habit_id = HabitId(params.habit_id);
    // parse_date only falls back when no input is given
    let from = parse_date(Some(params.from.as_str()), NaiveDate::MIN)?;

    let mut scores = tracker.habit_scores(habit_id)?;
    scores.invalidate_newer_than(Timestamp::from_date(from))?;

    Ok(InvalidateResponse {
        habit_id,
        from,
        message: format!("🧹 Cleared scores of '{}' from {} onward", scores.habit().name, from),
    })
}
