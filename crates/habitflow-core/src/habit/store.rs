//! Habit collection persistence and mutators.
//!
//! The store owns the `habits` slot. Every mutator rewrites the whole slot.
//! Mutations that name an unknown habit id are no-ops, not errors.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use uuid::Uuid;

use super::{compute_streak, Habit, NewHabit};
use crate::error::{Result, ValidationError};
use crate::storage::{keys, load_json, save_json, KvStore};

/// Ordered habit collection (insertion order is display order).
pub struct HabitStore<S> {
    store: S,
    habits: Vec<Habit>,
}

impl<S: KvStore> HabitStore<S> {
    /// Load the collection; a corrupt slot yields an empty collection.
    pub fn open(store: S) -> Result<Self> {
        let habits: Vec<Habit> = load_json(&store, keys::HABITS)?;
        Ok(Self { store, habits })
    }

    /// Re-read the slot, picking up writes made through another handle.
    pub fn reload(&mut self) -> Result<()> {
        self.habits = load_json(&self.store, keys::HABITS)?;
        tracing::debug!(habits = self.habits.len(), "habit collection reloaded");
        Ok(())
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// Create a habit with an empty history and a zero streak.
    ///
    /// # Errors
    /// Rejects blank titles; propagates storage failures.
    pub fn add(&mut self, new: NewHabit, now: DateTime<FixedOffset>) -> Result<&Habit> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }

        let habit = Habit {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: new.description.filter(|d| !d.trim().is_empty()),
            frequency: new.frequency,
            time_of_day: new.time_of_day,
            created_at: now.with_timezone(&Utc),
            completed_dates: Default::default(),
            streak: 0,
            icon: new.icon,
            color: new.color,
        };
        tracing::info!(habit_id = %habit.id, title = %habit.title, "habit created");

        self.habits.push(habit);
        self.persist()?;
        Ok(&self.habits[self.habits.len() - 1])
    }

    /// Flip completion of `date` and recompute the streak as of `now`.
    ///
    /// Returns `None` when no habit has this id.
    pub fn toggle_completion(
        &mut self,
        id: &str,
        date: NaiveDate,
        now: DateTime<FixedOffset>,
    ) -> Result<Option<&Habit>> {
        let Some(index) = self.habits.iter().position(|h| h.id == id) else {
            tracing::debug!(habit_id = id, "toggle ignored: unknown habit");
            return Ok(None);
        };

        let habit = &mut self.habits[index];
        if !habit.completed_dates.remove(&date) {
            habit.completed_dates.insert(date);
        }
        habit.streak = compute_streak(&habit.completed_dates, now);
        tracing::info!(
            habit_id = id,
            %date,
            completed = habit.completed_dates.contains(&date),
            streak = habit.streak,
            "habit completion toggled"
        );

        self.persist()?;
        Ok(Some(&self.habits[index]))
    }

    /// Remove a habit. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let before = self.habits.len();
        self.habits.retain(|h| h.id != id);
        if self.habits.len() == before {
            return Ok(false);
        }
        tracing::info!(habit_id = id, "habit deleted");
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        save_json(&self.store, keys::HABITS, &self.habits)
    }
}
