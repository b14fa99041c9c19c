/// Tool for creating new habits

use serde::{Deserialize, Serialize};
use crate::domain::{Category, Frequency, Habit, HabitId};
use crate::storage::HabitStorage;
use crate::{ScoreTracker, TrackerError};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize)]
pub struct CreateHabitParams {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    /// `daily`, `weekdays`, `weekends`, `weekly:N` or `every:N`
    pub frequency: String,
}

#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub habit_id: HabitId,
    pub message: String,
}

/// Validate and save a new habit
pub fn create_habit(
    tracker: &ScoreTracker,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, TrackerError> {
    let category = Category::parse(&params.category).ok_or_else(|| {
        TrackerError::InvalidInput(format!(
            "Invalid category '{}'. Valid options: health, productivity, social, creative, mindfulness, financial, household, personal, or custom:name",
            params.category
        ))
    })?;

    let frequency = Frequency::parse(&params.frequency).ok_or_else(|| {
        TrackerError::InvalidInput(format!(
            "Invalid frequency '{}'. Valid options: daily, weekdays, weekends, weekly:N, every:N",
            params.frequency
        ))
    })?;

    let mut habit = Habit::new(
        params.name.trim().to_string(),
        params.description,
        category,
        frequency,
        None,
        None,
    )?;

    let habit_id = tracker.storage().create_habit(&mut habit)?;

    Ok(CreateHabitResponse {
        habit_id,
        message: format!("✅ Created habit '{}' with id {}", habit.name, habit_id),
    })
}
