//! Dashboard statistics and schedule countdowns.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{longest_run, Habit, TimeOfDay};

/// Aggregate numbers across all habits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserStats {
    pub total_habits: usize,
    pub total_completions: usize,
    /// Highest current streak among habits.
    pub current_longest_streak: u32,
    /// Sum of current streaks.
    pub total_streak_days: u32,
    /// Longest run of consecutive days any habit ever reached.
    pub best_streak_ever: u32,
}

impl UserStats {
    pub fn from_habits(habits: &[Habit]) -> Self {
        habits.iter().fold(Self::default(), |mut stats, habit| {
            stats.total_habits += 1;
            stats.total_completions += habit.completed_dates.len();
            stats.current_longest_streak = stats.current_longest_streak.max(habit.streak);
            stats.total_streak_days += habit.streak;
            stats.best_streak_ever = stats
                .best_streak_ever
                .max(longest_run(&habit.completed_dates));
            stats
        })
    }
}

/// Time until the next occurrence of `at`, rolling to tomorrow once today's
/// slot has passed.
pub fn next_occurrence_in(at: TimeOfDay, now: DateTime<FixedOffset>) -> Duration {
    let local = now.naive_local();
    let mut target = local.date().and_time(at.as_naive());
    if target <= local {
        target += Duration::days(1);
    }
    target - local
}

/// Render a countdown as `{h}h {m}m {s}s`.
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::Frequency;
    use chrono::{NaiveDate, Utc};

    fn habit(streak: u32, dates: &[&str]) -> Habit {
        Habit {
            id: format!("h{streak}"),
            title: "t".into(),
            description: None,
            frequency: Frequency::Daily,
            time_of_day: None,
            created_at: Utc::now(),
            completed_dates: dates
                .iter()
                .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap())
                .collect(),
            streak,
            icon: None,
            color: "blue".into(),
        }
    }

    #[test]
    fn aggregates_across_habits() {
        let habits = vec![
            habit(2, &["2024-03-14", "2024-03-15"]),
            habit(0, &["2024-01-01", "2024-01-02", "2024-01-03", "2024-02-01"]),
        ];
        let stats = UserStats::from_habits(&habits);
        assert_eq!(stats.total_habits, 2);
        assert_eq!(stats.total_completions, 6);
        assert_eq!(stats.current_longest_streak, 2);
        assert_eq!(stats.total_streak_days, 2);
        assert_eq!(stats.best_streak_ever, 3);
    }

    #[test]
    fn empty_collection_is_all_zero() {
        assert_eq!(UserStats::from_habits(&[]), UserStats::default());
    }

    #[test]
    fn countdown_rolls_over_after_slot_passes() {
        let now = DateTime::parse_from_rfc3339("2024-03-15T08:30:00+07:00").unwrap();
        let later = TimeOfDay::new(9, 0).unwrap();
        assert_eq!(next_occurrence_in(later, now), Duration::minutes(30));

        let earlier = TimeOfDay::new(8, 0).unwrap();
        assert_eq!(
            next_occurrence_in(earlier, now),
            Duration::hours(23) + Duration::minutes(30)
        );

        let exact = TimeOfDay::new(8, 30).unwrap();
        assert_eq!(next_occurrence_in(exact, now), Duration::hours(24));
    }

    #[test]
    fn countdown_formatting() {
        let d = Duration::hours(1) + Duration::minutes(2) + Duration::seconds(3);
        assert_eq!(format_countdown(d), "1h 2m 3s");
        assert_eq!(format_countdown(Duration::seconds(-5)), "0h 0m 0s");
    }
}
