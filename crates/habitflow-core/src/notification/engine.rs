//! The notification engine.
//!
//! Owns the persisted event log (`stored`), the persisted read registry
//! (`read_ids`), the habit snapshot of the previous pass and the published
//! feed. A pass never blocks and always replaces the whole feed.

use std::collections::BTreeSet;

use super::{derive_notifications, detect_events, Notification, NotificationSettings};
use crate::clock::Clock;
use crate::error::Result;
use crate::habit::Habit;
use crate::storage::{keys, load_json, save_json, KvStore};

pub struct NotificationEngine<S, C> {
    store: S,
    clock: C,
    settings: NotificationSettings,
    stored: Vec<Notification>,
    read_ids: BTreeSet<String>,
    /// `None` until the first pass has run.
    previous: Option<Vec<Habit>>,
    feed: Vec<Notification>,
}

impl<S: KvStore, C: Clock> NotificationEngine<S, C> {
    /// Load persisted notification state. Corrupt slots start empty.
    pub fn open(store: S, clock: C, settings: NotificationSettings) -> Result<Self> {
        let stored: Vec<Notification> = load_json(&store, keys::STORED_NOTIFICATIONS)?;
        let read_ids: BTreeSet<String> = load_json(&store, keys::READ_NOTIFICATIONS)?;
        Ok(Self {
            store,
            clock,
            settings,
            stored,
            read_ids,
            previous: None,
            feed: Vec::new(),
        })
    }

    /// Re-read the event log and read registry from storage.
    pub fn reload(&mut self) -> Result<()> {
        self.stored = load_json(&self.store, keys::STORED_NOTIFICATIONS)?;
        self.read_ids = load_json(&self.store, keys::READ_NOTIFICATIONS)?;
        Ok(())
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn settings(&self) -> &NotificationSettings {
        &self.settings
    }

    /// Run one evaluation pass over `habits` and publish the new feed.
    pub fn evaluate(&mut self, habits: &[Habit]) -> Result<&[Notification]> {
        let now = self.clock.now();

        let events = match self.previous.as_deref() {
            None if self.settings.suppress_initial_events => {
                tracing::debug!(habits = habits.len(), "baseline pass, events suppressed");
                Vec::new()
            }
            previous => detect_events(previous.unwrap_or_default(), habits, now),
        };
        self.previous = Some(habits.to_vec());

        let mut fresh: Vec<Notification> = events
            .into_iter()
            .filter(|e| !self.stored.iter().any(|s| s.id == e.id))
            .collect();
        if !fresh.is_empty() {
            for event in &fresh {
                tracing::info!(id = %event.id, kind = ?event.kind, "event notification emitted");
            }
            fresh.append(&mut self.stored);
            self.stored = fresh;
            self.persist_stored()?;
        }

        let derived = derive_notifications(habits, now, &self.settings)
            .into_iter()
            .map(|mut n| {
                n.read = self.read_ids.contains(&n.id);
                n
            });

        let mut feed: Vec<Notification> = self.stored.iter().cloned().chain(derived).collect();
        // Stable: equal timestamps keep stored-before-derived insertion order.
        feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.feed = feed;

        tracing::debug!(
            feed = self.feed.len(),
            unread = self.unread_count(),
            "evaluation pass complete"
        );
        Ok(&self.feed)
    }

    /// The feed published by the latest pass, newest first.
    pub fn feed(&self) -> &[Notification] {
        &self.feed
    }

    pub fn unread(&self) -> impl Iterator<Item = &Notification> {
        self.feed.iter().filter(|n| !n.read)
    }

    pub fn unread_count(&self) -> usize {
        self.unread().count()
    }

    /// Persisted event notifications, most recent first.
    pub fn stored(&self) -> &[Notification] {
        &self.stored
    }

    pub fn is_marked_read(&self, id: &str) -> bool {
        self.read_ids.contains(id)
    }

    /// Mark one notification read. Idempotent; unknown ids are still
    /// remembered so a derived notification that appears later is read.
    pub fn mark_as_read(&mut self, id: &str) -> Result<()> {
        if self.read_ids.insert(id.to_string()) {
            self.persist_read_ids()?;
        }

        let mut changed = false;
        for n in self.stored.iter_mut().filter(|n| n.id == id && !n.read) {
            n.read = true;
            changed = true;
        }
        if changed {
            self.persist_stored()?;
        }

        for n in self.feed.iter_mut().filter(|n| n.id == id) {
            n.read = true;
        }
        Ok(())
    }

    /// Mark every stored event and every currently visible derived
    /// notification read.
    pub fn mark_all_as_read(&mut self) -> Result<()> {
        if self.stored.iter().any(|n| !n.read) {
            for n in &mut self.stored {
                n.read = true;
            }
            self.persist_stored()?;
        }

        let before = self.read_ids.len();
        self.read_ids.extend(
            self.feed
                .iter()
                .filter(|n| n.kind.is_derived())
                .map(|n| n.id.clone()),
        );
        if self.read_ids.len() != before {
            self.persist_read_ids()?;
        }

        for n in &mut self.feed {
            n.read = true;
        }
        Ok(())
    }

    fn persist_stored(&self) -> Result<()> {
        save_json(&self.store, keys::STORED_NOTIFICATIONS, &self.stored)
    }

    fn persist_read_ids(&self) -> Result<()> {
        save_json(&self.store, keys::READ_NOTIFICATIONS, &self.read_ids)
    }
}
