/// Habit entity and related functionality
///
/// This module defines the Habit struct that owns a score series. A habit only
/// receives an identifier once storage has saved it; score operations refuse
/// to run against a habit that has not been saved.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{Category, Frequency, HabitId, DomainError};

/// A habit represents something the user wants to do regularly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Row id assigned by storage (`None` until the habit is saved)
    pub id: Option<HabitId>,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Category for organization (health, productivity, etc.)
    pub category: Category,
    /// How often this habit should be performed
    pub frequency: Frequency,
    /// Optional numeric target (e.g., 30 for "30 minutes")
    pub target_value: Option<u32>,
    /// Unit for the target value (e.g., "minutes", "pages", "reps")
    pub unit: Option<String>,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Whether this habit is currently active (can be paused)
    pub is_active: bool,
}

impl Habit {
    /// Create a new, unsaved habit with validation
    pub fn new(
        name: String,
        description: Option<String>,
        category: Category,
        frequency: Frequency,
        target_value: Option<u32>,
        unit: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        Self::validate_description(&description)?;
        frequency.validate()?;
        Self::validate_target_and_unit(&target_value, &unit)?;

        Ok(Self {
            id: None,
            name,
            description,
            category,
            frequency,
            target_value,
            unit,
            created_at: Utc::now(),
            is_active: true,
        })
    }

    /// Create a habit from existing data (used when loading from database)
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        name: String,
        description: Option<String>,
        category: Category,
        frequency: Frequency,
        target_value: Option<u32>,
        unit: Option<String>,
        created_at: DateTime<Utc>,
        is_active: bool,
    ) -> Self {
        Self {
            id: Some(id),
            name,
            description,
            category,
            frequency,
            target_value,
            unit,
            created_at,
            is_active,
        }
    }

    /// Whether storage has assigned this habit an id
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    // Validation helper methods

    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.len() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }

    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.len() > 500 {
                return Err(DomainError::Validation {
                    message: "Description cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }

    /// Validate target value and unit together
    fn validate_target_and_unit(
        target_value: &Option<u32>,
        unit: &Option<String>,
    ) -> Result<(), DomainError> {
        if let Some(value) = target_value {
            if *value == 0 || *value > 10000 {
                return Err(DomainError::InvalidValue {
                    message: "Target value must be between 1 and 10000".to_string()
                });
            }
        }

        if let Some(unit_str) = unit {
            let trimmed = unit_str.trim();
            if trimmed.is_empty() || trimmed.len() > 20 {
                return Err(DomainError::InvalidValue {
                    message: "Unit must be 1-20 characters if specified".to_string()
                });
            }
        }

        Ok(())
    }
}
