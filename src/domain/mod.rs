/// Domain module containing core data types
///
/// This module defines the core entities (Habit, HabitEntry, Score), the
/// day-aligned Timestamp they are keyed by, and their validation rules.

pub mod habit;
pub mod entry;
pub mod score;
pub mod timestamp;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use entry::*;
pub use score::*;
pub use timestamp::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}
