/// Core types and enums used throughout the domain layer
///
/// This module defines the fundamental types like Category, Frequency, and ID types
/// that are used by Habit, HabitEntry, Score and the score engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use chrono::Weekday;
use uuid::Uuid;

/// Identifier of a persisted habit
///
/// This is the integer row id assigned by storage when the habit is first saved.
/// A habit that has never been saved has no `HabitId` at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HabitId(pub i64);

impl HabitId {
    /// Raw integer value, as stored in the database
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for HabitId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Unique identifier for a habit entry
///
/// Individual check-in records keep a random UUID so they can be created
/// without a database round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    /// Generate a new random entry ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an entry ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Categories for organizing habits into different life areas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Health,
    Productivity,
    Social,
    Creative,
    Mindfulness,
    Financial,
    Household,
    Personal,
    /// User-defined category with custom name
    Custom(String),
}

impl Category {
    /// Get the display name for this category
    pub fn display_name(&self) -> &str {
        match self {
            Category::Health => "Health",
            Category::Productivity => "Productivity",
            Category::Social => "Social",
            Category::Creative => "Creative",
            Category::Mindfulness => "Mindfulness",
            Category::Financial => "Financial",
            Category::Household => "Household",
            Category::Personal => "Personal",
            Category::Custom(name) => name,
        }
    }

    /// Parse a lowercase category name (`health`, `custom:reading`, ...)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "health" => Some(Category::Health),
            "productivity" => Some(Category::Productivity),
            "social" => Some(Category::Social),
            "creative" => Some(Category::Creative),
            "mindfulness" => Some(Category::Mindfulness),
            "financial" => Some(Category::Financial),
            "household" => Some(Category::Household),
            "personal" => Some(Category::Personal),
            other => other
                .strip_prefix("custom:")
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| Category::Custom(name.to_string())),
        }
    }
}

/// How often a habit should be performed
///
/// The frequency drives how quickly a habit's score rises and decays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    /// Every single day
    Daily,
    /// A specific number of times per week (1-7)
    Weekly(u8),
    /// Monday through Friday only
    Weekdays,
    /// Saturday and Sunday only
    Weekends,
    /// Specific days of the week (e.g., Monday, Wednesday, Friday)
    Custom(Vec<Weekday>),
    /// Every N days (e.g., every 3 days)
    Interval(u32),
}

impl Frequency {
    /// Validate that a frequency value is reasonable
    pub fn validate(&self) -> Result<(), crate::domain::DomainError> {
        match self {
            Frequency::Weekly(times) => {
                if *times == 0 || *times > 7 {
                    return Err(crate::domain::DomainError::InvalidFrequency(
                        format!("Weekly frequency must be 1-7, got {}", times)
                    ));
                }
            }
            Frequency::Custom(days) => {
                if days.is_empty() {
                    return Err(crate::domain::DomainError::InvalidFrequency(
                        "Custom frequency must specify at least one day".to_string()
                    ));
                }
                if days.len() > 7 {
                    return Err(crate::domain::DomainError::InvalidFrequency(
                        "Custom frequency cannot have more than 7 days".to_string()
                    ));
                }
            }
            Frequency::Interval(days) => {
                if *days == 0 {
                    return Err(crate::domain::DomainError::InvalidFrequency(
                        "Interval must be at least 1 day".to_string()
                    ));
                }
                if *days > 365 {
                    return Err(crate::domain::DomainError::InvalidFrequency(
                        "Interval cannot be longer than 365 days".to_string()
                    ));
                }
            }
            _ => {} // Daily, Weekdays, Weekends are always valid
        }
        Ok(())
    }

    /// Expected repetitions per day, in `(0.0, 1.0]`
    ///
    /// A daily habit is 1.0, three times a week is 3/7, every 4 days is 0.25.
    pub fn per_day(&self) -> f64 {
        match self {
            Frequency::Daily => 1.0,
            Frequency::Weekly(times) => f64::from(*times) / 7.0,
            Frequency::Weekdays => 5.0 / 7.0,
            Frequency::Weekends => 2.0 / 7.0,
            Frequency::Custom(days) => days.len() as f64 / 7.0,
            Frequency::Interval(days) => 1.0 / f64::from(*days),
        }
    }

    /// Parse the short CLI form: `daily`, `weekdays`, `weekends`,
    /// `weekly:N` or `every:N`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "daily" => Some(Frequency::Daily),
            "weekdays" => Some(Frequency::Weekdays),
            "weekends" => Some(Frequency::Weekends),
            other => {
                if let Some(n) = other.strip_prefix("weekly:") {
                    n.parse().ok().map(Frequency::Weekly)
                } else if let Some(n) = other.strip_prefix("every:") {
                    n.parse().ok().map(Frequency::Interval)
                } else {
                    None
                }
            }
        }
    }
}
