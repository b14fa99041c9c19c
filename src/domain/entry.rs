/// HabitEntry entity for tracking habit check-ins
///
/// A check-in is the raw input the score engine works from. Changing the
/// check-in history of a day makes every score from that day onward stale.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{EntryId, HabitId, DomainError};

/// A record of completing a habit on a specific day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitEntry {
    /// Unique identifier for this entry
    pub id: EntryId,
    /// Which habit this entry is for
    pub habit_id: HabitId,
    /// When this entry was created/logged
    pub logged_at: DateTime<Utc>,
    /// Which day this completion was for (can be different from logged_at)
    pub completed_at: NaiveDate,
    /// Actual amount achieved (if habit has a target)
    pub value: Option<u32>,
    /// Subjective intensity rating from 1-10
    pub intensity: Option<u8>,
    /// User's notes about this completion
    pub notes: Option<String>,
}

impl HabitEntry {
    /// Create a new habit entry with validation
    ///
    /// The logged_at timestamp is set to the current time.
    pub fn new(
        habit_id: HabitId,
        completed_at: NaiveDate,
        value: Option<u32>,
        intensity: Option<u8>,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_completed_at(&completed_at)?;
        Self::validate_value(&value)?;
        Self::validate_intensity(&intensity)?;
        Self::validate_notes(&notes)?;

        Ok(Self {
            id: EntryId::new(),
            habit_id,
            logged_at: Utc::now(),
            completed_at,
            value,
            intensity,
            notes,
        })
    }

    /// Create an entry from existing data (used when loading from database)
    pub fn from_existing(
        id: EntryId,
        habit_id: HabitId,
        logged_at: DateTime<Utc>,
        completed_at: NaiveDate,
        value: Option<u32>,
        intensity: Option<u8>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id,
            habit_id,
            logged_at,
            completed_at,
            value,
            intensity,
            notes,
        }
    }

    // Validation helper methods

    /// Validate that the completed_at date is not in the future
    fn validate_completed_at(date: &NaiveDate) -> Result<(), DomainError> {
        let today = Utc::now().date_naive();

        if *date > today {
            return Err(DomainError::InvalidDate(
                "Cannot log habits for future dates".to_string()
            ));
        }

        Ok(())
    }

    fn validate_value(value: &Option<u32>) -> Result<(), DomainError> {
        if let Some(val) = value {
            if *val > 100000 {
                return Err(DomainError::InvalidValue {
                    message: "Value cannot exceed 100000".to_string()
                });
            }
        }
        Ok(())
    }

    /// Validate the optional intensity rating (1-10)
    fn validate_intensity(intensity: &Option<u8>) -> Result<(), DomainError> {
        if let Some(rating) = intensity {
            if !(1..=10).contains(rating) {
                return Err(DomainError::InvalidValue {
                    message: "Intensity must be between 1 and 10".to_string()
                });
            }
        }
        Ok(())
    }

    fn validate_notes(notes: &Option<String>) -> Result<(), DomainError> {
        if let Some(note_text) = notes {
            if note_text.len() > 500 {
                return Err(DomainError::InvalidValue {
                    message: "Notes cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}
