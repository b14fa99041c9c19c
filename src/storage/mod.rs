/// Storage layer for persisting habits, check-ins and computed scores
///
/// This module handles all database operations using SQLite. The score list
/// only talks to storage through the traits below, so another key-ordered
/// backend can be dropped in without touching the caching logic.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDate;
use thiserror::Error;
use crate::domain::{Habit, HabitEntry, HabitId, Score, Timestamp};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: HabitId },

    #[error("Duplicate entry: habit {habit_id} already logged for date {date}")]
    DuplicateEntry { habit_id: HabitId, date: NaiveDate },

    #[error("Score for habit {found} cannot be stored under habit {expected}")]
    HabitMismatch { expected: HabitId, found: HabitId },

    #[error("Invalid stored value: {0}")]
    Corrupt(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Storage interface for habits and their check-ins
pub trait HabitStorage {
    /// Save a new habit and assign it an id
    fn create_habit(&self, habit: &mut Habit) -> Result<HabitId, StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: HabitId) -> Result<Habit, StorageError>;

    /// List habits, newest first
    fn list_habits(&self, active_only: bool) -> Result<Vec<Habit>, StorageError>;

    /// Create a new habit entry
    fn create_entry(&self, entry: &HabitEntry) -> Result<(), StorageError>;

    /// Get a habit's entries within an inclusive date range, newest first
    fn get_entries_by_date_range(
        &self,
        habit_id: HabitId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<HabitEntry>, StorageError>;

    /// Date of the habit's earliest check-in, if any
    fn oldest_entry_date(&self, habit_id: HabitId) -> Result<Option<NaiveDate>, StorageError>;
}

/// Durable, key-ordered store of computed scores
///
/// Rows are keyed by `(habit_id, timestamp)`; at most one row exists per key.
/// Every list returned by this trait is ordered newest first.
pub trait ScoreStorage {
    /// Insert all scores as one atomic unit; nothing is written on failure
    ///
    /// Every score must belong to `habit_id`.
    fn insert_scores(&self, habit_id: HabitId, scores: &[Score]) -> Result<(), StorageError>;

    /// Scores with `from <= timestamp <= to`
    fn scores_in_range(
        &self,
        habit_id: HabitId,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Score>, StorageError>;

    /// The score stored at exactly `timestamp`
    fn score_at(&self, habit_id: HabitId, timestamp: Timestamp) -> Result<Option<Score>, StorageError>;

    fn all_scores(&self, habit_id: HabitId) -> Result<Vec<Score>, StorageError>;

    /// The newest score strictly before `timestamp`
    fn score_before(&self, habit_id: HabitId, timestamp: Timestamp) -> Result<Option<Score>, StorageError>;

    fn newest_score(&self, habit_id: HabitId) -> Result<Option<Score>, StorageError>;

    fn oldest_score(&self, habit_id: HabitId) -> Result<Option<Score>, StorageError>;

    /// Delete every score with `timestamp >= from`, returning the number removed
    fn delete_scores_from(&self, habit_id: HabitId, from: Timestamp) -> Result<usize, StorageError>;
}
