/// Score list backed by durable storage
///
/// Queries that need a complete answer (`get_by_interval`, `to_list`,
/// `get_today_value`) first fill any gaps in the persisted series and then
/// read from storage. Queries that only ask what is already known
/// (`get_computed_by_timestamp`, newest/oldest) never compute anything.

use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::analytics::{ScoreComputer, ScoreEngine};
use crate::domain::{Clock, Habit, HabitId, Score, SystemClock, Timestamp};
use crate::scores::{ScoreError, ScoreEvent, TodayCache};
use crate::storage::{HabitStorage, ScoreStorage, StorageError};

const EVENT_CAPACITY: usize = 16;

/// Cached score series of a single habit
///
/// The list is the only writer of its habit's score rows; mutating methods
/// take `&mut self`, so sharing one list between writers needs external
/// synchronization.
pub struct ScoreList<'a, S, C = ScoreEngine> {
    storage: &'a S,
    habit: Habit,
    /// Storage copy of `habit`, loaded on first use
    habit_record: Option<Habit>,
    engine: C,
    clock: Box<dyn Clock + 'a>,
    cache: Option<TodayCache>,
    events: broadcast::Sender<ScoreEvent>,
    /// Invalidations from other lists on the same channel
    listener: broadcast::Receiver<ScoreEvent>,
}

impl<'a, S> ScoreList<'a, S, ScoreEngine>
where
    S: HabitStorage + ScoreStorage,
{
    /// Score list using the default engine and the system clock
    pub fn new(storage: &'a S, habit: Habit) -> Self {
        Self::with_engine(storage, habit, ScoreEngine::new())
    }
}

impl<'a, S, C> ScoreList<'a, S, C>
where
    S: HabitStorage + ScoreStorage,
    C: ScoreComputer,
{
    pub fn with_engine(storage: &'a S, habit: Habit, engine: C) -> Self {
        let (events, listener) = broadcast::channel(EVENT_CAPACITY);

        Self {
            storage,
            habit,
            habit_record: None,
            engine,
            clock: Box::new(SystemClock),
            cache: None,
            events,
            listener,
        }
    }

    /// Replace the clock that decides what "today" is
    pub fn with_clock(mut self, clock: impl Clock + 'a) -> Self {
        self.clock = Box::new(clock);
        self.cache = None;
        self
    }

    /// Publish change events on an existing channel instead of a private one
    ///
    /// The list also listens on that channel, so an invalidation made through
    /// another list of the same habit drops this list's today cache.
    pub fn with_events(mut self, events: broadcast::Sender<ScoreEvent>) -> Self {
        self.listener = events.subscribe();
        self.events = events;
        self
    }

    pub fn habit(&self) -> &Habit {
        &self.habit
    }

    /// Subscribe to invalidation notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ScoreEvent> {
        self.events.subscribe()
    }

    /// Persist scores as a single atomic batch
    ///
    /// Existing rows are never overwritten; a batch that repeats a stored
    /// timestamp fails as a whole.
    pub fn add(&mut self, scores: &[Score]) -> Result<(), ScoreError> {
        let habit_id = self.check()?;
        self.storage.insert_scores(habit_id, scores)?;
        Ok(())
    }

    /// All scores in `[from, to]`, newest first, computing missing days first
    pub fn get_by_interval(&mut self, from: Timestamp, to: Timestamp) -> Result<Vec<Score>, ScoreError> {
        let habit_id = self.check()?;
        if from > to {
            return Ok(Vec::new());
        }

        self.ensure_computed(habit_id, from, to)?;
        Ok(self.storage.scores_in_range(habit_id, from, to)?)
    }

    /// The score stored at exactly `timestamp`, without computing anything
    pub fn get_computed_by_timestamp(&mut self, timestamp: Timestamp) -> Result<Option<Score>, ScoreError> {
        let habit_id = self.check()?;
        Ok(self.storage.score_at(habit_id, timestamp)?)
    }

    /// Score value at `timestamp`, computing it if needed
    ///
    /// Returns 0 if the engine produces no score for that day.
    pub fn get_value(&mut self, timestamp: Timestamp) -> Result<i64, ScoreError> {
        let habit_id = self.check()?;
        self.ensure_computed(habit_id, timestamp, timestamp)?;

        let score = self.storage.score_at(habit_id, timestamp)?;
        Ok(score.map_or(0, |s| s.value))
    }

    /// Score value of the current day, memoized until the day changes
    pub fn get_today_value(&mut self) -> Result<i64, ScoreError> {
        let today = self.clock.today();
        self.drain_invalidations();

        if let Some(cache) = self.cache.filter(|c| !c.expired(today)) {
            return Ok(cache.value());
        }

        let value = self.get_value(today)?;
        self.cache = Some(TodayCache::new(value, today));
        Ok(value)
    }

    /// Discard every score at or after `timestamp`
    ///
    /// Clears the today cache and notifies subscribers once the rows are gone.
    pub fn invalidate_newer_than(&mut self, timestamp: Timestamp) -> Result<(), ScoreError> {
        let habit_id = self.check()?;
        self.cache = None;

        let removed = self.storage.delete_scores_from(habit_id, timestamp)?;
        tracing::debug!("Invalidated {} scores of habit {} from {}", removed, habit_id, timestamp);

        // No receivers is fine
        let _ = self.events.send(ScoreEvent::Invalidated { habit_id, from: timestamp });
        Ok(())
    }

    /// The full series from the first check-in to today, newest first
    pub fn to_list(&mut self) -> Result<Vec<Score>, ScoreError> {
        let habit_id = self.check()?;

        if let Some(first) = self.storage.oldest_entry_date(habit_id)? {
            let today = self.clock.today();
            self.ensure_computed(habit_id, Timestamp::from_date(first), today)?;
        }

        Ok(self.storage.all_scores(habit_id)?)
    }

    pub fn get_newest_computed(&mut self) -> Result<Option<Score>, ScoreError> {
        let habit_id = self.check()?;
        Ok(self.storage.newest_score(habit_id)?)
    }

    pub fn get_oldest_computed(&mut self) -> Result<Option<Score>, ScoreError> {
        let habit_id = self.check()?;
        Ok(self.storage.oldest_score(habit_id)?)
    }

    /// Make sure every day in `[from, to]` has a stored score
    ///
    /// Days before the oldest row start from 0 and days after the newest row
    /// continue from its value. Holes left between stored rows by direct
    /// `add` calls are filled from the row preceding each hole.
    fn ensure_computed(&mut self, habit_id: HabitId, from: Timestamp, to: Timestamp) -> Result<(), ScoreError> {
        let newest = self.storage.newest_score(habit_id)?;
        let oldest = self.storage.oldest_score(habit_id)?;

        match (oldest, newest) {
            (Some(oldest), Some(newest)) => {
                self.compute_run(habit_id, from, oldest.timestamp.minus_days(1), 0)?;
                self.compute_run(habit_id, newest.timestamp.plus_days(1), to, newest.value)?;
                self.fill_holes(habit_id, from, to)?;
            }
            _ => {
                // Start the series at the first check-in so later days see its effect
                let first = self.storage.oldest_entry_date(habit_id)?.map(Timestamp::from_date);
                let from = first.map_or(from, |first| first.min(from));
                self.compute_run(habit_id, from, to, 0)?;
            }
        }

        Ok(())
    }

    /// Compute every missing day in `[from, to]` that lies between stored rows
    fn fill_holes(&mut self, habit_id: HabitId, from: Timestamp, to: Timestamp) -> Result<(), ScoreError> {
        let mut stored = self.storage.scores_in_range(habit_id, from, to)?;
        stored.reverse();

        let mut expected = from;
        let mut previous = self.storage.score_before(habit_id, from)?.map_or(0, |s| s.value);

        for score in stored {
            if expected < score.timestamp {
                self.compute_run(habit_id, expected, score.timestamp.minus_days(1), previous)?;
            }
            previous = score.value;
            expected = score.timestamp.plus_days(1);
        }

        self.compute_run(habit_id, expected, to, previous)
    }

    fn compute_run(
        &mut self,
        habit_id: HabitId,
        from: Timestamp,
        to: Timestamp,
        previous: i64,
    ) -> Result<(), ScoreError> {
        if from > to {
            return Ok(());
        }

        let entries = self.storage.get_entries_by_date_range(habit_id, from.date(), to.date())?;
        let habit = self.habit_record.as_ref().unwrap_or(&self.habit);
        let scores = self.engine.compute(habit, habit_id, &entries, from, to, previous);

        if scores.is_empty() {
            return Ok(());
        }
        self.add(&scores)
    }

    /// Drop the today cache if any list invalidated the day it covers
    fn drain_invalidations(&mut self) {
        loop {
            match self.listener.try_recv() {
                Ok(ScoreEvent::Invalidated { habit_id, from }) => {
                    let stale = self.cache.is_some_and(|c| c.day() >= from);
                    if stale && self.habit.id == Some(habit_id) {
                        self.cache = None;
                    }
                }
                // Missed events may have touched this habit
                Err(TryRecvError::Lagged(_)) => self.cache = None,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    /// Resolve the habit id, loading the stored habit once
    fn check(&mut self) -> Result<HabitId, ScoreError> {
        let habit_id = self.habit.id.ok_or(ScoreError::NotPersisted)?;

        if self.habit_record.is_none() {
            let record = self.storage.get_habit(habit_id).map_err(|e| match e {
                StorageError::HabitNotFound { habit_id } => ScoreError::NotFound { habit_id },
                other => ScoreError::Storage(other),
            })?;
            self.habit_record = Some(record);
        }

        Ok(habit_id)
    }
}
