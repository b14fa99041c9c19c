/// Cached score series
///
/// `ScoreList` is the per-habit view of the score cache: it fills gaps on
/// demand through a `ScoreComputer`, serves reads from storage, and truncates
/// the series when the underlying check-ins change.

pub mod cache;
pub mod list;

pub use cache::TodayCache;
pub use list::ScoreList;

use thiserror::Error;
use crate::domain::{HabitId, Timestamp};
use crate::storage::StorageError;

/// Errors returned by score list operations
#[derive(Error, Debug)]
pub enum ScoreError {
    /// The habit has never been saved, so it has no id to key scores by
    #[error("habit is not saved")]
    NotPersisted,

    #[error("habit not found: {habit_id}")]
    NotFound { habit_id: HabitId },

    #[error("score storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Change notification published by a score list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEvent {
    /// Every score of `habit_id` at or after `from` was discarded
    Invalidated { habit_id: HabitId, from: Timestamp },
}
