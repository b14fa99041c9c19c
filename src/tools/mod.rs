/// Command handlers for the score tracker
///
/// Each tool takes a params struct, works against a `ScoreTracker`, and
/// returns a serializable response. The CLI is a thin layer over these.

pub mod create;
pub mod log;
pub mod list;
pub mod history;
pub mod invalidate;

pub use create::*;
pub use log::*;
pub use list::*;
pub use history::*;
pub use invalidate::*;

use chrono::NaiveDate;
use crate::TrackerError;

/// Parse an optional `YYYY-MM-DD` date, falling back to `default`
pub(crate) fn parse_date(input: Option<&str>, default: NaiveDate) -> Result<NaiveDate, TrackerError> {
    match input {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| TrackerError::InvalidInput(format!("invalid date '{}', expected YYYY-MM-DD", s))),
        None => Ok(default),
    }
}
