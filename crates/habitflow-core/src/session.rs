//! Application session: habit mutations followed by an evaluation pass.
//!
//! [`HabitSession`] is the only place that mutates habits, and every
//! mutator re-runs the notification engine before returning, so the feed
//! never lags behind the habit collection.

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::error::Result;
use crate::habit::{Habit, HabitStore, NewHabit, UserStats};
use crate::notification::{Notification, NotificationEngine, NotificationSettings};
use crate::storage::KvStore;

pub struct HabitSession<S, C> {
    habits: HabitStore<S>,
    notifications: NotificationEngine<S, C>,
}

impl<S: KvStore + Clone, C: Clock> HabitSession<S, C> {
    /// Load both engines and run the baseline pass.
    pub fn open(store: S, clock: C, settings: NotificationSettings) -> Result<Self> {
        let habits = HabitStore::open(store.clone())?;
        let notifications = NotificationEngine::open(store, clock, settings)?;
        let mut session = Self {
            habits,
            notifications,
        };
        session.evaluate()?;
        Ok(session)
    }

    pub fn habits(&self) -> &[Habit] {
        self.habits.habits()
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.get(id)
    }

    pub fn today(&self) -> NaiveDate {
        self.notifications.clock().now().date_naive()
    }

    pub fn add_habit(&mut self, new: NewHabit) -> Result<Habit> {
        let now = self.notifications.clock().now();
        let habit = self.habits.add(new, now)?.clone();
        self.evaluate()?;
        Ok(habit)
    }

    /// Toggle completion on `date`. `None` for an unknown id.
    pub fn toggle_completion(&mut self, id: &str, date: NaiveDate) -> Result<Option<Habit>> {
        let now = self.notifications.clock().now();
        let habit = self.habits.toggle_completion(id, date, now)?.cloned();
        if habit.is_some() {
            self.evaluate()?;
        }
        Ok(habit)
    }

    pub fn toggle_today(&mut self, id: &str) -> Result<Option<Habit>> {
        let today = self.today();
        self.toggle_completion(id, today)
    }

    pub fn delete_habit(&mut self, id: &str) -> Result<bool> {
        let removed = self.habits.delete(id)?;
        if removed {
            self.evaluate()?;
        }
        Ok(removed)
    }

    /// Re-read habits and notification state from storage, then run a pass.
    ///
    /// For long-lived sessions that share the store with other writers.
    pub fn refresh(&mut self) -> Result<&[Notification]> {
        self.habits.reload()?;
        self.notifications.reload()?;
        self.evaluate()
    }

    /// Re-run the evaluation pass against the current clock.
    pub fn evaluate(&mut self) -> Result<&[Notification]> {
        self.notifications.evaluate(self.habits.habits())
    }

    pub fn feed(&self) -> &[Notification] {
        self.notifications.feed()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.unread_count()
    }

    pub fn mark_as_read(&mut self, id: &str) -> Result<()> {
        self.notifications.mark_as_read(id)
    }

    pub fn mark_all_as_read(&mut self) -> Result<()> {
        self.notifications.mark_all_as_read()
    }

    pub fn stats(&self) -> UserStats {
        UserStats::from_habits(self.habits.habits())
    }

    pub fn notifications(&self) -> &NotificationEngine<S, C> {
        &self.notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notification::NotificationType;
    use crate::storage::MemoryStore;
    use chrono::{DateTime, Duration};

    fn clock() -> ManualClock {
        ManualClock::new(DateTime::parse_from_rfc3339("2024-03-15T09:00:00+07:00").unwrap())
    }

    #[test]
    fn mutations_refresh_the_feed() {
        let mem = MemoryStore::new();
        let clock = clock();
        let mut session = HabitSession::open(&mem, &clock, NotificationSettings::default()).unwrap();
        assert!(session.feed().is_empty());

        let habit = session.add_habit(NewHabit::new("Meditate")).unwrap();
        assert_eq!(session.unread_count(), 1);
        assert_eq!(session.feed()[0].kind, NotificationType::Success);

        clock.advance(Duration::minutes(1));
        let toggled = session.toggle_today(&habit.id).unwrap().unwrap();
        assert_eq!(toggled.streak, 1);
        assert_eq!(session.feed()[0].id, format!("streak-{}-1-2024-03-15", habit.id));
        assert_eq!(session.unread_count(), 2);

        assert!(session.delete_habit(&habit.id).unwrap());
        assert!(session.habits().is_empty());
        // Event notifications outlive their habit.
        assert_eq!(session.feed().len(), 2);
    }

    #[test]
    fn existing_habits_are_not_announced_on_reopen() {
        let mem = MemoryStore::new();
        let clock = clock();
        {
            let mut session =
                HabitSession::open(&mem, &clock, NotificationSettings::default()).unwrap();
            session.add_habit(NewHabit::new("Walk")).unwrap();
            session.mark_all_as_read().unwrap();
        }
        let session = HabitSession::open(&mem, &clock, NotificationSettings::default()).unwrap();
        assert_eq!(session.habits().len(), 1);
        assert_eq!(session.feed().len(), 1);
        assert_eq!(session.unread_count(), 0);
    }

    #[test]
    fn unknown_toggle_is_a_noop() {
        let mem = MemoryStore::new();
        let clock = clock();
        let mut session = HabitSession::open(&mem, &clock, NotificationSettings::default()).unwrap();
        assert!(session.toggle_today("nope").unwrap().is_none());
        assert!(!session.delete_habit("nope").unwrap());
    }

    #[test]
    fn refresh_drops_risk_completed_elsewhere() {
        let mem = MemoryStore::new();
        let clock = ManualClock::new(
            DateTime::parse_from_rfc3339("2024-03-15T20:00:00+07:00").unwrap(),
        );
        let mut watcher =
            HabitSession::open(&mem, &clock, NotificationSettings::default()).unwrap();
        let id = {
            let mut other =
                HabitSession::open(&mem, &clock, NotificationSettings::default()).unwrap();
            other.add_habit(NewHabit::new("Floss")).unwrap().id
        };

        watcher.refresh().unwrap();
        let risk = format!("risk-{id}-2024-03-15");
        assert!(watcher.feed().iter().any(|n| n.id == risk));

        let mut other = HabitSession::open(&mem, &clock, NotificationSettings::default()).unwrap();
        other.toggle_today(&id).unwrap();

        clock.advance(Duration::minutes(1));
        watcher.evaluate().unwrap();
        assert!(watcher.feed().iter().any(|n| n.id == risk));
        watcher.refresh().unwrap();
        assert!(watcher.feed().iter().all(|n| n.id != risk));
    }

    #[test]
    fn stats_follow_habits() {
        let mem = MemoryStore::new();
        let clock = clock();
        let mut session = HabitSession::open(&mem, &clock, NotificationSettings::default()).unwrap();
        let id = session.add_habit(NewHabit::new("Journal")).unwrap().id;
        session
            .toggle_completion(&id, session.today() - Duration::days(1))
            .unwrap();
        session.toggle_today(&id).unwrap();

        let stats = session.stats();
        assert_eq!(stats.total_habits, 1);
        assert_eq!(stats.total_completions, 2);
        assert_eq!(stats.current_longest_streak, 2);
    }
}
