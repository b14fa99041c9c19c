/// Basic unit tests to verify core types
use chrono::NaiveDate;
use habit_score_store::*;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    #[test]
    fn test_habit_creation() {
        let habit = Habit::new(
            "Test Habit".to_string(),
            Some("A test habit".to_string()),
            Category::Health,
            Frequency::Daily,
            None,
            None,
        );

        assert!(habit.is_ok());
        let habit = habit.unwrap();
        assert_eq!(habit.name, "Test Habit");
        assert!(!habit.is_persisted());
    }

    #[test]
    fn test_habit_entry_creation() {
        let today = chrono::Utc::now().date_naive();

        let entry = HabitEntry::new(HabitId(3), today, Some(100), Some(8), Some("Great work!".to_string()));

        assert!(entry.is_ok());
        let entry = entry.unwrap();
        assert_eq!(entry.habit_id, HabitId(3));
        assert_eq!(entry.completed_at, today);
    }

    #[test]
    fn test_timestamp_from_date_is_day_aligned() {
        let date = NaiveDate::from_ymd_opt(2022, 11, 5).unwrap();
        let ts = Timestamp::from_date(date);

        assert_eq!(ts.millis() % DAY_LENGTH_MS, 0);
        assert_eq!(ts.date(), date);
        assert_eq!(Timestamp::from(date), ts);
    }

    #[test]
    fn test_today_cache_expiry() {
        let today = Timestamp::from_date(NaiveDate::from_ymd_opt(2022, 11, 5).unwrap());
        let cache = TodayCache::new(10, today);

        assert!(!cache.expired(today));
        assert!(cache.expired(today.plus_days(1)));
        assert_eq!(cache.day(), today);
    }

    #[test]
    fn test_system_clock_is_day_aligned() {
        let today = SystemClock.today();
        assert_eq!(today.millis() % DAY_LENGTH_MS, 0);
        assert_eq!(today.date(), chrono::Utc::now().date_naive());
    }

    #[test]
    fn test_engine_scores_range() {
        let habit = Habit::new("Walk".to_string(), None, Category::Health, Frequency::Weekends, None, None).unwrap();
        let from = Timestamp::from_date(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());

        let scores = ScoreEngine::new().compute(&habit, HabitId(1), &[], from, from.plus_days(6), 0);

        assert_eq!(scores.len(), 7);
        assert!(scores.iter().all(|s| s.value == 0 && s.habit_id == HabitId(1)));
    }

    #[test]
    fn test_storage_creation() {
        let storage = SqliteStorage::in_memory();
        assert!(storage.is_ok());
    }
}
