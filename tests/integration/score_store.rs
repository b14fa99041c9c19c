/// Behavioral tests for the cached score list
use std::cell::Cell;
use std::rc::Rc;

use chrono::NaiveDate;
use habit_score_store::*;
use tokio_test::{assert_err, assert_ok};

/// Clock the tests move by hand
struct ManualClock(Rc<Cell<Timestamp>>);

impl Clock for ManualClock {
    fn today(&self) -> Timestamp {
        self.0.get()
    }
}

/// Default engine that counts how often it runs
#[derive(Default)]
struct CountingEngine {
    calls: Rc<Cell<usize>>,
}

impl ScoreComputer for CountingEngine {
    fn compute(
        &self,
        habit: &Habit,
        habit_id: HabitId,
        entries: &[HabitEntry],
        from: Timestamp,
        to: Timestamp,
        previous: i64,
    ) -> Vec<Score> {
        self.calls.set(self.calls.get() + 1);
        ScoreEngine.compute(habit, habit_id, entries, from, to, previous)
    }
}

/// Engine that yields the same value for every day
struct ConstantEngine(i64);

impl ScoreComputer for ConstantEngine {
    fn compute(
        &self,
        _habit: &Habit,
        habit_id: HabitId,
        _entries: &[HabitEntry],
        from: Timestamp,
        to: Timestamp,
        _previous: i64,
    ) -> Vec<Score> {
        (0..=from.days_until(to))
            .map(|n| Score::new(habit_id, from.plus_days(n), self.0))
            .collect()
    }
}

/// Engine that adds one to the previous value for every day
struct CarryEngine;

impl ScoreComputer for CarryEngine {
    fn compute(
        &self,
        _habit: &Habit,
        habit_id: HabitId,
        _entries: &[HabitEntry],
        from: Timestamp,
        to: Timestamp,
        previous: i64,
    ) -> Vec<Score> {
        (0..=from.days_until(to))
            .map(|n| Score::new(habit_id, from.plus_days(n), previous + n + 1))
            .collect()
    }
}

fn day(n: i64) -> Timestamp {
    Timestamp::from_date(NaiveDate::from_ymd_opt(2023, 9, 1).unwrap()).plus_days(n)
}

fn saved_habit(storage: &SqliteStorage) -> Habit {
    let mut habit = Habit::new(
        "Morning Run".to_string(),
        None,
        Category::Health,
        Frequency::Daily,
        None,
        None,
    )
    .unwrap();
    storage.create_habit(&mut habit).unwrap();
    habit
}

fn check_in(storage: &SqliteStorage, habit: &Habit, n: i64) {
    let entry = HabitEntry::new(habit.id.unwrap(), day(n).date(), None, None, None).unwrap();
    storage.create_entry(&entry).unwrap();
}

#[test]
fn test_point_lookup_returns_added_score() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    let habit_id = habit.id.unwrap();
    let mut list = ScoreList::new(&storage, habit);

    assert_ok!(list.add(&[Score::new(habit_id, day(2), 3)]));

    assert_eq!(
        list.get_computed_by_timestamp(day(2)).unwrap(),
        Some(Score::new(habit_id, day(2), 3))
    );
    assert_eq!(list.get_computed_by_timestamp(day(1)).unwrap(), None);
    assert_eq!(list.get_computed_by_timestamp(day(3)).unwrap(), None);
}

#[test]
fn test_point_lookup_unaffected_by_neighbours() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    let habit_id = habit.id.unwrap();
    let mut list = ScoreList::new(&storage, habit);

    list.add(&[Score::new(habit_id, day(5), 321)]).unwrap();
    list.add(&[Score::new(habit_id, day(1), 7)]).unwrap();
    list.add(&[Score::new(habit_id, day(9), 8)]).unwrap();
    list.invalidate_newer_than(day(9)).unwrap();

    assert_eq!(list.get_computed_by_timestamp(day(5)).unwrap().map(|s| s.value), Some(321));
}

#[test]
fn test_point_lookup_never_computes() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    check_in(&storage, &habit, 0);
    let engine = CountingEngine::default();
    let calls = engine.calls.clone();
    let mut list = ScoreList::with_engine(&storage, habit, engine);

    assert_eq!(list.get_computed_by_timestamp(day(3)).unwrap(), None);
    assert_eq!(list.get_newest_computed().unwrap(), None);
    assert_eq!(list.get_oldest_computed().unwrap(), None);
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_invalidation_removes_suffix_only() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    check_in(&storage, &habit, 0);
    check_in(&storage, &habit, 2);
    let mut list = ScoreList::new(&storage, habit);

    let before = list.get_by_interval(day(0), day(6)).unwrap();
    let value_at_2 = before.iter().find(|s| s.timestamp == day(2)).unwrap().value;

    list.invalidate_newer_than(day(3)).unwrap();

    for n in 3..=6 {
        assert_eq!(list.get_computed_by_timestamp(day(n)).unwrap(), None);
    }
    assert_eq!(list.get_computed_by_timestamp(day(2)).unwrap().map(|s| s.value), Some(value_at_2));
    assert_eq!(list.get_newest_computed().unwrap().map(|s| s.timestamp), Some(day(2)));
}

#[test]
fn test_invalidation_is_idempotent() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    let mut list = ScoreList::new(&storage, habit);
    let mut events = list.subscribe();

    assert_ok!(list.invalidate_newer_than(day(0)));
    assert_ok!(list.invalidate_newer_than(day(0)));

    // Each call still notifies
    assert!(events.try_recv().is_ok());
    assert!(events.try_recv().is_ok());
    assert!(list.get_newest_computed().unwrap().is_none());
}

#[test]
fn test_interval_is_descending_and_complete() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    check_in(&storage, &habit, 1);
    check_in(&storage, &habit, 4);
    let mut list = ScoreList::new(&storage, habit);

    let scores = list.get_by_interval(day(2), day(8)).unwrap();

    let days: Vec<Timestamp> = scores.iter().map(|s| s.timestamp).collect();
    let expected: Vec<Timestamp> = (2..=8).rev().map(day).collect();
    assert_eq!(days, expected);
}

#[test]
fn test_interval_before_computed_range_is_filled() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    check_in(&storage, &habit, 10);
    let mut list = ScoreList::new(&storage, habit);

    list.get_by_interval(day(10), day(12)).unwrap();
    let earlier = list.get_by_interval(day(5), day(11)).unwrap();

    assert_eq!(earlier.len(), 7);
    assert!(earlier.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
    // Days before the first check-in carry no score
    assert!(earlier.iter().filter(|s| s.timestamp < day(10)).all(|s| s.value == 0));
}

#[test]
fn test_interval_fills_holes_between_added_scores() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    let habit_id = habit.id.unwrap();
    let mut list = ScoreList::with_engine(&storage, habit, ConstantEngine(3));

    list.add(&[Score::new(habit_id, day(1), 10)]).unwrap();
    list.add(&[Score::new(habit_id, day(5), 50)]).unwrap();

    let scores = list.get_by_interval(day(0), day(6)).unwrap();

    let days: Vec<Timestamp> = scores.iter().map(|s| s.timestamp).collect();
    assert_eq!(days, (0..=6).rev().map(day).collect::<Vec<_>>());
    // Added rows are kept as they were
    assert_eq!(list.get_computed_by_timestamp(day(1)).unwrap().map(|s| s.value), Some(10));
    assert_eq!(list.get_computed_by_timestamp(day(5)).unwrap().map(|s| s.value), Some(50));
    assert!((2..=4).all(|n| scores.iter().any(|s| s.timestamp == day(n) && s.value == 3)));
}

#[test]
fn test_hole_continues_from_preceding_score() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    let habit_id = habit.id.unwrap();
    let mut list = ScoreList::with_engine(&storage, habit, CarryEngine);

    list.add(&[Score::new(habit_id, day(1), 10), Score::new(habit_id, day(5), 50)]).unwrap();

    // The query starts inside the hole, so the seed comes from day 1
    let scores = list.get_by_interval(day(3), day(4)).unwrap();
    assert_eq!(scores, vec![Score::new(habit_id, day(4), 12), Score::new(habit_id, day(3), 11)]);

    // Day 2 was outside the query and is filled later from day 1
    assert_eq!(list.get_computed_by_timestamp(day(2)).unwrap(), None);
    assert_eq!(list.get_value(day(2)).unwrap(), 11);
    assert_eq!(list.get_by_interval(day(1), day(5)).unwrap().len(), 5);
}

#[test]
fn test_interval_is_idempotent() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    check_in(&storage, &habit, 0);
    check_in(&storage, &habit, 3);
    let engine = CountingEngine::default();
    let calls = engine.calls.clone();
    let mut list = ScoreList::with_engine(&storage, habit, engine);

    let first = list.get_by_interval(day(0), day(10)).unwrap();
    let calls_after_first = calls.get();
    let second = list.get_by_interval(day(0), day(10)).unwrap();

    assert_eq!(first, second);
    assert!(calls_after_first > 0);
    assert_eq!(calls.get(), calls_after_first);
}

#[test]
fn test_series_extends_from_newest_value() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    for n in 0..5 {
        check_in(&storage, &habit, n);
    }
    let mut list = ScoreList::new(&storage, habit);

    // Computing in two steps gives the same series as one step
    list.get_by_interval(day(0), day(2)).unwrap();
    let stepwise = list.get_by_interval(day(0), day(6)).unwrap();

    let other = SqliteStorage::in_memory().unwrap();
    let other_habit = saved_habit(&other);
    for n in 0..5 {
        check_in(&other, &other_habit, n);
    }
    let at_once = ScoreList::new(&other, other_habit).get_by_interval(day(0), day(6)).unwrap();

    let values = |scores: &Vec<Score>| scores.iter().map(|s| s.value).collect::<Vec<_>>();
    assert_eq!(values(&stepwise), values(&at_once));
}

#[test]
fn test_today_value_is_cached_per_day() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    check_in(&storage, &habit, 0);
    let engine = CountingEngine::default();
    let calls = engine.calls.clone();
    let now = Rc::new(Cell::new(day(0)));
    let mut list = ScoreList::with_engine(&storage, habit, engine).with_clock(ManualClock(now.clone()));

    let first = list.get_today_value().unwrap();
    let calls_after_first = calls.get();
    let again = list.get_today_value().unwrap();

    assert_eq!(first, again);
    assert_eq!(calls.get(), calls_after_first);

    now.set(day(1));
    let next_day = list.get_today_value().unwrap();
    assert!(calls.get() > calls_after_first);
    assert_ne!(next_day, first);
}

#[test]
fn test_invalidation_drops_today_cache() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    let now = Rc::new(Cell::new(day(3)));
    let mut list = ScoreList::new(&storage, habit.clone()).with_clock(ManualClock(now.clone()));

    assert_eq!(list.get_today_value().unwrap(), 0);

    check_in(&storage, &habit, 3);
    // Still the cached value until the series is invalidated
    assert_eq!(list.get_today_value().unwrap(), 0);

    list.invalidate_newer_than(day(3)).unwrap();
    assert!(list.get_today_value().unwrap() > 0);
}

#[test]
fn test_to_list_covers_history_until_today() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    check_in(&storage, &habit, 2);
    let now = Rc::new(Cell::new(day(6)));
    let mut list = ScoreList::new(&storage, habit).with_clock(ManualClock(now));

    let all = list.to_list().unwrap();

    let days: Vec<Timestamp> = all.iter().map(|s| s.timestamp).collect();
    assert_eq!(days, (2..=6).rev().map(day).collect::<Vec<_>>());
}

#[test]
fn test_to_list_without_checkins_is_empty() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    let mut list = ScoreList::new(&storage, habit);

    assert!(list.to_list().unwrap().is_empty());
}

#[test]
fn test_concrete_add_invalidate_scenario() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    let habit_id = habit.id.unwrap();
    let mut list = ScoreList::with_engine(&storage, habit, ConstantEngine(3));

    list.add(&[Score::new(habit_id, day(0), 3)]).unwrap();
    assert_eq!(list.get_computed_by_timestamp(day(0)).unwrap(), Some(Score::new(habit_id, day(0), 3)));

    list.invalidate_newer_than(day(0)).unwrap();
    assert_eq!(list.get_computed_by_timestamp(day(0)).unwrap(), None);
    assert_eq!(list.get_newest_computed().unwrap(), None);

    // Recomputing fills the day again through the engine
    let scores = list.get_by_interval(day(0), day(1)).unwrap();
    assert_eq!(scores, vec![Score::new(habit_id, day(1), 3), Score::new(habit_id, day(0), 3)]);

    list.invalidate_newer_than(day(1)).unwrap();
    assert_eq!(list.get_newest_computed().unwrap(), Some(Score::new(habit_id, day(0), 3)));
}

#[test]
fn test_add_on_unsaved_habit_writes_nothing() {
    let storage = SqliteStorage::in_memory().unwrap();
    let saved = saved_habit(&storage);
    let unsaved = Habit::new("Draft".to_string(), None, Category::Personal, Frequency::Daily, None, None).unwrap();
    let mut list = ScoreList::new(&storage, unsaved);

    let result = list.add(&[Score::new(saved.id.unwrap(), day(0), 3)]);

    assert!(matches!(assert_err!(result), ScoreError::NotPersisted));
    assert!(storage.all_scores(saved.id.unwrap()).unwrap().is_empty());
}

#[test]
fn test_add_never_overwrites() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    let habit_id = habit.id.unwrap();
    let mut list = ScoreList::new(&storage, habit);

    list.add(&[Score::new(habit_id, day(1), 10)]).unwrap();
    let result = list.add(&[Score::new(habit_id, day(0), 5), Score::new(habit_id, day(1), 99)]);

    assert!(matches!(assert_err!(result), ScoreError::Storage(_)));
    assert_eq!(list.get_computed_by_timestamp(day(0)).unwrap(), None);
    assert_eq!(list.get_computed_by_timestamp(day(1)).unwrap().map(|s| s.value), Some(10));
}

#[test]
fn test_add_rejects_scores_of_other_habit() {
    let storage = SqliteStorage::in_memory().unwrap();
    let habit = saved_habit(&storage);
    let other = saved_habit(&storage);
    let other_id = other.id.unwrap();
    let mut list = ScoreList::new(&storage, habit);

    let result = list.add(&[Score::new(other_id, day(0), 3)]);

    assert!(matches!(
        assert_err!(result),
        ScoreError::Storage(StorageError::HabitMismatch { .. })
    ));
    assert_eq!(list.get_newest_computed().unwrap(), None);
    assert!(storage.all_scores(other_id).unwrap().is_empty());
}

#[test]
fn test_lists_are_isolated_per_habit() {
    let storage = SqliteStorage::in_memory().unwrap();
    let first = saved_habit(&storage);
    let second = saved_habit(&storage);
    check_in(&storage, &first, 0);

    let mut first_list = ScoreList::new(&storage, first);
    let mut second_list = ScoreList::new(&storage, second);
    first_list.get_by_interval(day(0), day(3)).unwrap();
    second_list.get_by_interval(day(0), day(3)).unwrap();

    second_list.invalidate_newer_than(day(0)).unwrap();

    assert_eq!(first_list.get_by_interval(day(0), day(3)).unwrap().len(), 4);
    assert!(first_list.get_computed_by_timestamp(day(0)).unwrap().unwrap().value > 0);
    assert_eq!(second_list.get_newest_computed().unwrap(), None);
}

#[test]
fn test_invalidation_elsewhere_drops_today_cache() {
    let tracker = ScoreTracker::in_memory().unwrap();
    let habit = saved_habit(tracker.storage());
    let now = Rc::new(Cell::new(day(3)));
    let mut reader = tracker.score_list(habit.clone()).with_clock(ManualClock(now.clone()));

    assert_eq!(reader.get_today_value().unwrap(), 0);

    check_in(tracker.storage(), &habit, 3);
    tracker.score_list(habit.clone()).invalidate_newer_than(day(2)).unwrap();

    assert!(reader.get_today_value().unwrap() > 0);
}

#[test]
fn test_other_habit_invalidation_keeps_today_cache() {
    let tracker = ScoreTracker::in_memory().unwrap();
    let habit = saved_habit(tracker.storage());
    let other = saved_habit(tracker.storage());
    let now = Rc::new(Cell::new(day(3)));
    let mut reader = tracker.score_list(habit.clone()).with_clock(ManualClock(now));

    assert_eq!(reader.get_today_value().unwrap(), 0);

    check_in(tracker.storage(), &habit, 3);
    tracker.score_list(other).invalidate_newer_than(day(0)).unwrap();

    // Only invalidations of this habit reach the cache
    assert_eq!(reader.get_today_value().unwrap(), 0);
}

#[tokio::test]
async fn test_tracker_broadcasts_invalidation() {
    let tracker = ScoreTracker::in_memory().unwrap();
    let habit = saved_habit(tracker.storage());
    let habit_id = habit.id.unwrap();
    let mut events = tracker.subscribe();

    tracker.score_list(habit).invalidate_newer_than(day(7)).unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event, ScoreEvent::Invalidated { habit_id, from: day(7) });
}
