/// SQLite implementation of the storage interfaces
///
/// This module provides the concrete SQLite implementation for storing
/// habits, check-ins and computed scores. It handles all SQL queries and
/// row conversion.

use std::path::PathBuf;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use chrono::NaiveDate;

use crate::domain::{
    Category, EntryId, Habit, HabitEntry, HabitId, Score, Timestamp
};
use crate::storage::{migrations, HabitStorage, ScoreStorage, StorageError};

const HABIT_COLUMNS: &str =
    "id, name, description, category, frequency_data, target_value, unit, created_at, is_active";

const ENTRY_COLUMNS: &str =
    "id, habit_id, logged_at, completed_at, value, intensity, notes";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// both `HabitStorage` and `ScoreStorage`.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database file and bring its schema up to date
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::configure(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Private in-memory database, mostly useful for tests
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;

        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self, StorageError> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    fn category_to_string(category: &Category) -> String {
        match category {
            Category::Custom(name) => format!("custom:{}", name),
            other => other.display_name().to_lowercase(),
        }
    }

    fn string_to_category(s: &str) -> Result<Category, StorageError> {
        match s.strip_prefix("custom:") {
            Some(name) => Ok(Category::Custom(name.to_string())),
            None => Category::parse(s)
                .ok_or_else(|| StorageError::Corrupt(format!("invalid category '{}'", s))),
        }
    }

    fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
        let category_str: String = row.get(3)?;
        let category = Self::string_to_category(&category_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(3, "Invalid category".to_string(), rusqlite::types::Type::Text)
        })?;

        let frequency_json: String = row.get(4)?;
        let frequency = serde_json::from_str(&frequency_json).map_err(|_| {
            rusqlite::Error::InvalidColumnType(4, "Invalid frequency".to_string(), rusqlite::types::Type::Text)
        })?;

        let created_at_str: String = row.get(7)?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(7, "Invalid datetime".to_string(), rusqlite::types::Type::Text)
            })?
            .with_timezone(&chrono::Utc);

        Ok(Habit::from_existing(
            HabitId(row.get(0)?),
            row.get(1)?, // name
            row.get(2)?, // description
            category,
            frequency,
            row.get(5)?, // target_value
            row.get(6)?, // unit
            created_at,
            row.get(8)?, // is_active
        ))
    }

    fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<HabitEntry> {
        let entry_id_str: String = row.get(0)?;
        let entry_id = EntryId::from_string(&entry_id_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(0, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
        })?;

        let logged_at_str: String = row.get(2)?;
        let logged_at = chrono::DateTime::parse_from_rfc3339(&logged_at_str)
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(2, "Invalid datetime".to_string(), rusqlite::types::Type::Text)
            })?
            .with_timezone(&chrono::Utc);

        let completed_at_str: String = row.get(3)?;
        let completed_at = NaiveDate::parse_from_str(&completed_at_str, "%Y-%m-%d")
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(3, "Invalid date".to_string(), rusqlite::types::Type::Text)
            })?;

        Ok(HabitEntry::from_existing(
            entry_id,
            HabitId(row.get(1)?),
            logged_at,
            completed_at,
            row.get(4)?, // value
            row.get(5)?, // intensity
            row.get(6)?, // notes
        ))
    }

    /// Rows are selected as `habit_id, timestamp, score`
    fn score_from_row(row: &Row<'_>) -> rusqlite::Result<Score> {
        Ok(Score::new(
            HabitId(row.get(0)?),
            Timestamp::from_millis(row.get(1)?),
            row.get(2)?,
        ))
    }

    fn query_scores<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Score>, StorageError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let score_iter = stmt.query_map(params, Self::score_from_row)?;

        let mut scores = Vec::new();
        for score in score_iter {
            scores.push(score?);
        }

        Ok(scores)
    }

    fn query_single_score<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Option<Score>, StorageError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let score = stmt.query_row(params, Self::score_from_row).optional()?;
        Ok(score)
    }

    fn query_entries<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<HabitEntry>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let entry_iter = stmt.query_map(params, Self::entry_from_row)?;

        let mut entries = Vec::new();
        for entry in entry_iter {
            entries.push(entry?);
        }

        Ok(entries)
    }
}

impl HabitStorage for SqliteStorage {
    fn create_habit(&self, habit: &mut Habit) -> Result<HabitId, StorageError> {
        let category_str = Self::category_to_string(&habit.category);
        let frequency_json = serde_json::to_string(&habit.frequency)?;

        self.conn.execute(
            "INSERT INTO habits (
                name, description, category, frequency_data,
                target_value, unit, created_at, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                habit.name,
                habit.description,
                category_str,
                frequency_json,
                habit.target_value,
                habit.unit,
                habit.created_at.to_rfc3339(),
                habit.is_active
            ],
        )?;

        let habit_id = HabitId(self.conn.last_insert_rowid());
        habit.id = Some(habit_id);

        tracing::debug!("Created habit: {} ({})", habit.name, habit_id);
        Ok(habit_id)
    }

    fn get_habit(&self, habit_id: HabitId) -> Result<Habit, StorageError> {
        let sql = format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;

        let result = stmt.query_row(params![habit_id.value()], Self::habit_from_row);

        match result {
            Ok(habit) => Ok(habit),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(StorageError::HabitNotFound { habit_id })
            },
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn list_habits(&self, active_only: bool) -> Result<Vec<Habit>, StorageError> {
        let mut sql = format!("SELECT {} FROM habits", HABIT_COLUMNS);

        if active_only {
            sql.push_str(" WHERE is_active = 1");
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let habit_iter = stmt.query_map([], Self::habit_from_row)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    fn create_entry(&self, entry: &HabitEntry) -> Result<(), StorageError> {
        let result = self.conn.execute(
            "INSERT INTO habit_entries (
                id, habit_id, logged_at, completed_at, value, intensity, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.id.to_string(),
                entry.habit_id.value(),
                entry.logged_at.to_rfc3339(),
                entry.completed_at.to_string(),
                entry.value,
                entry.intensity,
                entry.notes
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!("Created habit entry: {} for habit {}", entry.id, entry.habit_id);
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
                // Either the (habit, day) pair exists or the habit itself does not
                match self.get_habit(entry.habit_id) {
                    Ok(_) => Err(StorageError::DuplicateEntry {
                        habit_id: entry.habit_id,
                        date: entry.completed_at,
                    }),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn get_entries_by_date_range(
        &self,
        habit_id: HabitId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<HabitEntry>, StorageError> {
        let sql = format!(
            "SELECT {} FROM habit_entries
             WHERE habit_id = ?1 AND completed_at BETWEEN ?2 AND ?3
             ORDER BY completed_at DESC, logged_at DESC",
            ENTRY_COLUMNS
        );

        self.query_entries(
            &sql,
            params![habit_id.value(), start_date.to_string(), end_date.to_string()],
        )
    }

    fn oldest_entry_date(&self, habit_id: HabitId) -> Result<Option<NaiveDate>, StorageError> {
        let oldest: Option<String> = self.conn.query_row(
            "SELECT MIN(completed_at) FROM habit_entries WHERE habit_id = ?1",
            params![habit_id.value()],
            |row| row.get(0),
        )?;

        oldest
            .map(|s| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|_| StorageError::Corrupt(format!("invalid check-in date '{}'", s)))
            })
            .transpose()
    }
}

impl ScoreStorage for SqliteStorage {
    fn insert_scores(&self, habit_id: HabitId, scores: &[Score]) -> Result<(), StorageError> {
        if let Some(stray) = scores.iter().find(|s| s.habit_id != habit_id) {
            return Err(StorageError::HabitMismatch { expected: habit_id, found: stray.habit_id });
        }

        // Dropping the transaction without commit rolls the whole batch back
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO scores (habit_id, timestamp, score) VALUES (?1, ?2, ?3)"
            )?;
            for score in scores {
                stmt.execute(params![habit_id.value(), score.timestamp.millis(), score.value])?;
            }
        }
        tx.commit()?;

        tracing::debug!("Inserted {} scores for habit {}", scores.len(), habit_id);
        Ok(())
    }

    fn scores_in_range(
        &self,
        habit_id: HabitId,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Score>, StorageError> {
        self.query_scores(
            "SELECT habit_id, timestamp, score FROM scores
             WHERE habit_id = ?1 AND timestamp >= ?2 AND timestamp <= ?3
             ORDER BY timestamp DESC",
            params![habit_id.value(), from.millis(), to.millis()],
        )
    }

    fn score_at(&self, habit_id: HabitId, timestamp: Timestamp) -> Result<Option<Score>, StorageError> {
        self.query_single_score(
            "SELECT habit_id, timestamp, score FROM scores
             WHERE habit_id = ?1 AND timestamp = ?2",
            params![habit_id.value(), timestamp.millis()],
        )
    }

    fn all_scores(&self, habit_id: HabitId) -> Result<Vec<Score>, StorageError> {
        self.query_scores(
            "SELECT habit_id, timestamp, score FROM scores
             WHERE habit_id = ?1 ORDER BY timestamp DESC",
            params![habit_id.value()],
        )
    }

    fn score_before(&self, habit_id: HabitId, timestamp: Timestamp) -> Result<Option<Score>, StorageError> {
        self.query_single_score(
            "SELECT habit_id, timestamp, score FROM scores
             WHERE habit_id = ?1 AND timestamp < ?2 ORDER BY timestamp DESC LIMIT 1",
            params![habit_id.value(), timestamp.millis()],
        )
    }

    fn newest_score(&self, habit_id: HabitId) -> Result<Option<Score>, StorageError> {
        self.query_single_score(
            "SELECT habit_id, timestamp, score FROM scores
             WHERE habit_id = ?1 ORDER BY timestamp DESC LIMIT 1",
            params![habit_id.value()],
        )
    }

    fn oldest_score(&self, habit_id: HabitId) -> Result<Option<Score>, StorageError> {
        self.query_single_score(
            "SELECT habit_id, timestamp, score FROM scores
             WHERE habit_id = ?1 ORDER BY timestamp ASC LIMIT 1",
            params![habit_id.value()],
        )
    }

    fn delete_scores_from(&self, habit_id: HabitId, from: Timestamp) -> Result<usize, StorageError> {
        let removed = self.conn.execute(
            "DELETE FROM scores WHERE habit_id = ?1 AND timestamp >= ?2",
            params![habit_id.value(), from.millis()],
        )?;

        tracing::debug!("Deleted {} scores for habit {} from {}", removed, habit_id, from);
        Ok(removed)
    }
}
