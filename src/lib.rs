/// Public library interface for the habit score store
///
/// This module exports the score list, its storage backend and the
/// `ScoreTracker` facade that ties a database to per-habit score lists.

use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::broadcast;

// Internal modules
mod domain;
mod storage;
mod analytics;
mod scores;
pub mod tools;

// Re-export public modules and types
pub use domain::*;
pub use storage::{HabitStorage, ScoreStorage, SqliteStorage, StorageError};
pub use analytics::{ScoreComputer, ScoreEngine};
pub use scores::{ScoreError, ScoreEvent, ScoreList, TodayCache};

const EVENT_CAPACITY: usize = 64;

/// Errors surfaced by the tracker and its tools
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Database error: {0}")]
    Database(#[from] StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    #[error("Score error: {0}")]
    Score(#[from] ScoreError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Entry point owning the database and the shared change channel
///
/// Every score list handed out by the tracker publishes its invalidations on
/// the tracker's channel, so one subscriber sees changes for all habits.
///
/// Lists are not kept by the tracker. Each one owns its today cache, which
/// lives as long as the list and is dropped when any list of the same
/// tracker invalidates the cached day.
pub struct ScoreTracker {
    storage: SqliteStorage,
    events: broadcast::Sender<ScoreEvent>,
}

impl ScoreTracker {
    /// Open the tracker on the given database file, creating the schema if needed
    pub fn new(db_path: PathBuf) -> Result<Self, TrackerError> {
        tracing::info!("Initializing score tracker with database: {:?}", db_path);
        Ok(Self::from_storage(SqliteStorage::new(db_path)?))
    }

    /// Tracker on a private in-memory database
    pub fn in_memory() -> Result<Self, TrackerError> {
        Ok(Self::from_storage(SqliteStorage::in_memory()?))
    }

    fn from_storage(storage: SqliteStorage) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { storage, events }
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Subscribe to score changes of every habit
    pub fn subscribe(&self) -> broadcast::Receiver<ScoreEvent> {
        self.events.subscribe()
    }

    /// Score list for a habit the caller already holds
    pub fn score_list(&self, habit: Habit) -> ScoreList<'_, SqliteStorage> {
        ScoreList::new(&self.storage, habit).with_events(self.events.clone())
    }

    /// Load a saved habit and return a new score list for it
    ///
    /// The list starts with an empty today cache.
    pub fn habit_scores(&self, habit_id: HabitId) -> Result<ScoreList<'_, SqliteStorage>, TrackerError> {
        let habit = self.storage.get_habit(habit_id)?;
        Ok(self.score_list(habit))
    }
}
