/// Tool for reading a habit's score history

use serde::{Deserialize, Serialize};
use chrono::{Duration, NaiveDate, Utc};
use crate::domain::{HabitId, Timestamp};
use crate::tools::parse_date;
use crate::{ScoreTracker, TrackerError};

/// Days shown when no start date is given
const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct ScoreHistoryParams {
    pub habit_id: i64,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScorePoint {
    pub date: NaiveDate,
    pub value: i64,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct ScoreHistoryResponse {
    pub habit_id: HabitId,
    pub name: String,
    /// Newest first
    pub scores: Vec<ScorePoint>,
}

/// Scores of one habit between two dates, computing missing days
pub fn score_history(
    tracker: &ScoreTracker,
    params: ScoreHistoryParams,
) -> Result<ScoreHistoryResponse, TrackerError> {
    let habit_id = HabitId(params.habit_id);
    let today = Utc::now().date_naive();

    let to = parse_date(params.to.as_deref(), today)?;
    let from = parse_date(params.from.as_deref(), to - Duration::days(DEFAULT_WINDOW_DAYS - 1))?;
    if from > to {
        return Err(TrackerError::InvalidInput(format!(
            "start date {} is after end date {}", from, to
        )));
    }

    let mut scores = tracker.habit_scores(habit_id)?;
    let series = scores.get_by_interval(Timestamp::from_date(from), Timestamp::from_date(to))?;

    Ok(ScoreHistoryResponse {
        habit_id,
        name: scores.habit().name.clone(),
        scores: series
            .into_iter()
            .map(|score| ScorePoint {
                date: score.timestamp.date(),
                value: score.value,
                percentage: score.percentage(),
            })
            .collect(),
    })
}
