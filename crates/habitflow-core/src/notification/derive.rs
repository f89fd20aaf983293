//! Pure notification generation.
//!
//! Ids are built from (category, habit id, discriminant) only, never from
//! the generation time, so re-running a pass reproduces the same ids.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

use super::{Notification, NotificationSettings, NotificationType, Priority};
use crate::habit::{Frequency, Habit};

const MS_PER_HOUR: i64 = 60 * 60 * 1000;

pub fn success_id(habit_id: &str) -> String {
    format!("new-{habit_id}")
}

/// The day keeps a streak rebuilt after a break from colliding with the
/// announcement of the same value before it.
pub fn achievement_id(habit_id: &str, streak: u32, day: NaiveDate) -> String {
    format!("streak-{habit_id}-{streak}-{}", day.format("%Y-%m-%d"))
}

pub fn risk_id(habit_id: &str, day: NaiveDate) -> String {
    format!("risk-{habit_id}-{}", day.format("%Y-%m-%d"))
}

pub fn reminder_id(habit_id: &str, day: NaiveDate) -> String {
    format!("reminder-{habit_id}-{}", day.format("%Y-%m-%d"))
}

/// Event notifications for the transition `previous -> current`.
///
/// Habits missing from `previous` produce a success event; habits whose
/// streak grew produce an achievement event. Deleted habits and shrinking
/// streaks produce nothing.
pub fn detect_events(
    previous: &[Habit],
    current: &[Habit],
    now: DateTime<FixedOffset>,
) -> Vec<Notification> {
    let today = now.date_naive();
    let stamp = now.with_timezone(&Utc);
    let mut events = Vec::new();
    for habit in current {
        match previous.iter().find(|p| p.id == habit.id) {
            None => events.push(Notification {
                id: success_id(&habit.id),
                kind: NotificationType::Success,
                title: "New habit! ✨".into(),
                message: format!("Added habit \"{}\".", habit.title),
                timestamp: stamp,
                read: false,
                habit_id: Some(habit.id.clone()),
                priority: Some(Priority::Medium),
            }),
            Some(prev) if habit.streak > prev.streak => events.push(Notification {
                id: achievement_id(&habit.id, habit.streak, today),
                kind: NotificationType::Achievement,
                title: "Streak updated! 🔥".into(),
                message: format!(
                    "Great work! You reached a {}-day streak on \"{}\"!",
                    habit.streak, habit.title
                ),
                timestamp: stamp,
                read: false,
                habit_id: Some(habit.id.clone()),
                priority: Some(Priority::High),
            }),
            Some(_) => {}
        }
    }
    events
}

/// Risk and reminder notifications for `habits` at `now`, all unread.
pub fn derive_notifications(
    habits: &[Habit],
    now: DateTime<FixedOffset>,
    settings: &NotificationSettings,
) -> Vec<Notification> {
    let today = now.date_naive();
    let local = now.naive_local();
    let stamp = now.with_timezone(&Utc);
    let end_of_day = today.and_time(end_of_day_time());

    let mut derived = Vec::new();
    for habit in habits {
        if habit.is_completed_on(today) {
            continue;
        }

        if habit.frequency == Frequency::Daily {
            let left = end_of_day - local;
            if left > Duration::zero() && left <= settings.risk_window {
                let hours = ceil_hours(left);
                derived.push(Notification {
                    id: risk_id(&habit.id, today),
                    kind: NotificationType::Risk,
                    title: "Streak at risk! 🔥".into(),
                    message: format!(
                        "{hours} {} left to keep your streak on \"{}\"!",
                        if hours == 1 { "hour" } else { "hours" },
                        habit.title
                    ),
                    timestamp: stamp,
                    read: false,
                    habit_id: Some(habit.id.clone()),
                    priority: Some(Priority::High),
                });
            }
        }

        if let Some(at) = habit.time_of_day {
            let since = local - today.and_time(at.as_naive());
            if since > Duration::zero() && since < settings.reminder_window {
                derived.push(Notification {
                    id: reminder_id(&habit.id, today),
                    kind: NotificationType::Reminder,
                    title: "Reminder ⏰".into(),
                    message: format!("Time for \"{}\" ({at}).", habit.title),
                    timestamp: stamp,
                    read: false,
                    habit_id: Some(habit.id.clone()),
                    priority: Some(Priority::Medium),
                });
            }
        }
    }
    derived
}

fn end_of_day_time() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn ceil_hours(d: Duration) -> i64 {
    let ms = d.num_milliseconds();
    (ms + MS_PER_HOUR - 1) / MS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::TimeOfDay;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    fn habit(id: &str, frequency: Frequency, time: Option<TimeOfDay>) -> Habit {
        Habit {
            id: id.into(),
            title: format!("Habit {id}"),
            description: None,
            frequency,
            time_of_day: time,
            created_at: Utc::now(),
            completed_dates: Default::default(),
            streak: 0,
            icon: None,
            color: "blue".into(),
        }
    }

    #[test]
    fn ids_are_pure_functions_of_their_inputs() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(success_id("h1"), "new-h1");
        assert_eq!(achievement_id("h1", 4, day), "streak-h1-4-2024-03-15");
        assert_eq!(risk_id("h1", day), "risk-h1-2024-03-15");
        assert_eq!(reminder_id("h1", day), "reminder-h1-2024-03-15");
    }

    #[test]
    fn new_habit_and_streak_growth_emit_events() {
        let prev = vec![habit("a", Frequency::Daily, None)];
        let mut grown = prev[0].clone();
        grown.streak = 1;
        let current = vec![grown, habit("b", Frequency::Weekly, None)];

        let events = detect_events(&prev, &current, at("2024-03-15T09:00:00+07:00"));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "streak-a-1-2024-03-15");
        assert_eq!(events[0].priority, Some(Priority::High));
        assert!(events[0].message.contains("1-day streak"));
        assert_eq!(events[0].timestamp.to_rfc3339(), "2024-03-15T02:00:00+00:00");
        assert_eq!(events[1].id, "new-b");
        assert_eq!(events[1].kind, NotificationType::Success);
        assert_eq!(events[1].priority, Some(Priority::Medium));
    }

    #[test]
    fn unchanged_or_shrinking_streaks_are_silent() {
        let mut prev = habit("a", Frequency::Daily, None);
        prev.streak = 3;
        let mut cur = prev.clone();
        let now = at("2024-03-15T09:00:00+07:00");
        assert!(detect_events(&[prev.clone()], &[cur.clone()], now).is_empty());
        cur.streak = 0;
        assert!(detect_events(&[prev], &[cur], now).is_empty());
    }

    #[test]
    fn risk_only_inside_window() {
        let habits = vec![habit("a", Frequency::Daily, None)];
        let s = NotificationSettings::default();

        assert!(derive_notifications(&habits, at("2024-03-15T17:00:00+07:00"), &s).is_empty());

        let n = derive_notifications(&habits, at("2024-03-15T18:30:00+07:00"), &s);
        assert_eq!(n.len(), 1);
        assert_eq!(n[0].id, "risk-a-2024-03-15");
        assert_eq!(n[0].priority, Some(Priority::High));
        assert!(n[0].message.starts_with("6 hours left"));

        let n = derive_notifications(&habits, at("2024-03-15T23:30:00+07:00"), &s);
        assert!(n[0].message.starts_with("1 hour left"));
    }

    #[test]
    fn risk_skips_non_daily_and_completed() {
        let s = NotificationSettings::default();
        let now = at("2024-03-15T20:00:00+07:00");
        let weekly = habit("w", Frequency::Weekly, None);
        let mut done = habit("d", Frequency::Daily, None);
        done.completed_dates.insert(now.date_naive());

        assert!(derive_notifications(&[weekly, done], now, &s).is_empty());
    }

    #[test]
    fn reminder_window_is_open_on_both_ends() {
        let s = NotificationSettings::default();
        let habits = vec![habit("r", Frequency::Weekly, TimeOfDay::new(9, 0))];

        assert!(derive_notifications(&habits, at("2024-03-15T09:00:00+07:00"), &s).is_empty());
        let n = derive_notifications(&habits, at("2024-03-15T09:01:00+07:00"), &s);
        assert_eq!(n.len(), 1);
        assert_eq!(n[0].id, "reminder-r-2024-03-15");
        assert_eq!(n[0].kind, NotificationType::Reminder);
        assert!(n[0].message.contains("(09:00)"));
        assert!(derive_notifications(&habits, at("2024-03-15T11:00:00+07:00"), &s).is_empty());
    }

    #[test]
    fn daily_habit_with_time_can_emit_both() {
        let s = NotificationSettings::default();
        let habits = vec![habit("x", Frequency::Daily, TimeOfDay::new(19, 0))];
        let n = derive_notifications(&habits, at("2024-03-15T19:30:00+07:00"), &s);
        let kinds: Vec<_> = n.iter().map(|n| n.kind).collect();
        assert_eq!(kinds, [NotificationType::Risk, NotificationType::Reminder]);
    }

    #[test]
    fn thresholds_are_configurable() {
        let s = NotificationSettings {
            risk_window: Duration::hours(1),
            reminder_window: Duration::minutes(10),
            suppress_initial_events: true,
        };
        let habits = vec![habit("a", Frequency::Daily, TimeOfDay::new(22, 0))];
        assert!(derive_notifications(&habits, at("2024-03-15T22:30:00+07:00"), &s).is_empty());
        let n = derive_notifications(&habits, at("2024-03-15T23:05:00+07:00"), &s);
        assert_eq!(n.len(), 1);
        assert_eq!(n[0].kind, NotificationType::Risk);
    }
}
