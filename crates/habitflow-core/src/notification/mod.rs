//! Notification feed: event notifications detected from habit transitions,
//! derived notifications recomputed from the clock, and persisted read state.

mod derive;
mod engine;

pub use derive::{
    achievement_id, derive_notifications, detect_events, reminder_id, risk_id, success_id,
};
pub use engine::NotificationEngine;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::NotificationsConfig;

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Reminder,
    Risk,
    Milestone,
    Achievement,
    Success,
}

impl NotificationType {
    /// Risk and reminder entries are rebuilt every pass; everything else is
    /// a persisted event.
    pub fn is_derived(self) -> bool {
        matches!(self, NotificationType::Risk | NotificationType::Reminder)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A single feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Stable across re-derivation of the same logical event.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// Thresholds for one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// Remaining time before end of day at which daily habits turn risky.
    pub risk_window: Duration,
    /// How long after its scheduled time a reminder stays live.
    pub reminder_window: Duration,
    /// Record the first pass as a baseline without emitting events.
    pub suppress_initial_events: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self::from(&NotificationsConfig::default())
    }
}

impl From<&NotificationsConfig> for NotificationSettings {
    fn from(cfg: &NotificationsConfig) -> Self {
        Self {
            risk_window: Duration::hours(i64::from(cfg.risk_window_hours)),
            reminder_window: Duration::hours(i64::from(cfg.reminder_window_hours)),
            suppress_initial_events: cfg.suppress_initial_events,
        }
    }
}
