/// Tool for listing habits with their current score

use serde::{Deserialize, Serialize};
use crate::domain::{Frequency, HabitId, Score};
use crate::storage::HabitStorage;
use crate::{ScoreTracker, TrackerError};

#[derive(Debug, Deserialize)]
pub struct ListHabitsParams {
    pub active_only: Option<bool>,
}

/// Information about a habit in the list
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub habit_id: HabitId,
    pub name: String,
    pub category: String,
    pub frequency: String,
    /// Today's score, 0.0 to 1.0
    pub today_score: f64,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub avg_score: f64,
}

fn describe_frequency(frequency: &Frequency) -> String {
    match frequency {
        Frequency::Daily => "daily".to_string(),
        Frequency::Weekly(times) => format!("{}x per week", times),
        Frequency::Weekdays => "weekdays".to_string(),
        Frequency::Weekends => "weekends".to_string(),
        Frequency::Custom(days) => days.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(","),
        Frequency::Interval(days) => format!("every {} days", days),
    }
}

/// List habits along with today's score of each
pub fn list_habits(
    tracker: &ScoreTracker,
    params: ListHabitsParams,
) -> Result<ListHabitsResponse, TrackerError> {
    let active_only = params.active_only.unwrap_or(true);
    let habits = tracker.storage().list_habits(active_only)?;

    let mut summaries = Vec::with_capacity(habits.len());
    for habit in habits {
        let Some(habit_id) = habit.id else { continue };
        let name = habit.name.clone();
        let category = habit.category.display_name().to_string();
        let frequency = describe_frequency(&habit.frequency);
        let is_active = habit.is_active;

        let today_value = tracker.score_list(habit).get_today_value()?;

        summaries.push(HabitSummary {
            habit_id,
            name,
            category,
            frequency,
            today_score: today_value as f64 / Score::MAX_VALUE as f64,
            is_active,
        });
    }

    let avg_score = if summaries.is_empty() {
        0.0
    } else {
        summaries.iter().map(|h| h.today_score).sum::<f64>() / summaries.len() as f64
    };

    Ok(ListHabitsResponse {
        habits: summaries,
        avg_score,
    })
}
