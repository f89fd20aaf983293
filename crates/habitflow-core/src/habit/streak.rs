//! Consecutive-day streak computation.
//!
//! A streak is the run of consecutive calendar days ending today or
//! yesterday on which a habit was completed. Dates are treated as a set,
//! so duplicates never inflate the count.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate};

/// Current streak for `dates` as seen at `now`.
///
/// "Today" is the calendar day of `now` in its own offset.
pub fn compute_streak<'a, I>(dates: I, now: DateTime<FixedOffset>) -> u32
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    current_streak(dates, now.date_naive())
}

/// Current streak for `dates` with an explicit `today`.
pub fn current_streak<'a, I>(dates: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    let days: BTreeSet<NaiveDate> = dates.into_iter().copied().collect();
    let mut newest_first = days.iter().rev();

    let Some(&latest) = newest_first.next() else {
        return 0;
    };

    // Not done today or yesterday: the run is already broken.
    if latest != today && Some(latest) != today.pred_opt() {
        return 0;
    }

    let mut streak = 1;
    let mut cursor = latest;
    for &date in newest_first {
        if cursor.pred_opt() != Some(date) {
            break;
        }
        streak += 1;
        cursor = date;
    }
    streak
}

/// Longest run of consecutive days anywhere in `dates`.
pub fn longest_run<'a, I>(dates: I) -> u32
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    let days: BTreeSet<NaiveDate> = dates.into_iter().copied().collect();
    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for &date in &days {
        run = match prev {
            Some(p) if p.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(date);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn days_ago(n: i64) -> NaiveDate {
        today() - Duration::days(n)
    }

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(current_streak(&[] as &[NaiveDate], today()), 0);
    }

    #[test]
    fn consecutive_days_ending_today() {
        assert_eq!(current_streak(&[days_ago(0)], today()), 1);
        assert_eq!(current_streak(&[days_ago(0), days_ago(1)], today()), 2);
        assert_eq!(
            current_streak(&[days_ago(2), days_ago(0), days_ago(1)], today()),
            3
        );
    }

    #[test]
    fn streak_may_end_yesterday() {
        assert_eq!(current_streak(&[days_ago(1), days_ago(2)], today()), 2);
    }

    #[test]
    fn stale_history_is_broken() {
        assert_eq!(current_streak(&[days_ago(2)], today()), 0);
        assert_eq!(
            current_streak(&[days_ago(2), days_ago(3), days_ago(4)], today()),
            0
        );
    }

    #[test]
    fn gap_stops_the_walk() {
        assert_eq!(
            current_streak(&[days_ago(0), days_ago(1), days_ago(3), days_ago(4)], today()),
            2
        );
    }

    #[test]
    fn duplicates_do_not_inflate() {
        assert_eq!(current_streak(&[days_ago(0), days_ago(0)], today()), 1);
    }

    #[test]
    fn future_completion_breaks_streak() {
        let tomorrow = today() + Duration::days(1);
        assert_eq!(current_streak(&[tomorrow, days_ago(0)], today()), 0);
    }

    #[test]
    fn today_follows_the_clock_offset() {
        // 23:30 on the 14th in UTC-05:00 is already the 15th in UTC.
        let now = DateTime::parse_from_rfc3339("2024-03-14T23:30:00-05:00").unwrap();
        let fourteenth = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        assert_eq!(compute_streak(&[fourteenth], now), 1);
    }

    #[test]
    fn longest_run_scans_whole_history() {
        let dates = [days_ago(10), days_ago(9), days_ago(8), days_ago(1), days_ago(0)];
        assert_eq!(longest_run(&dates), 3);
        assert_eq!(longest_run(&[] as &[NaiveDate]), 0);
    }

    proptest! {
        #[test]
        fn order_and_duplicates_are_irrelevant(offsets in prop::collection::vec(0i64..20, 0..30)) {
            let dates: Vec<NaiveDate> = offsets.iter().map(|&n| days_ago(n)).collect();
            let mut shuffled = dates.clone();
            shuffled.reverse();
            shuffled.extend(dates.iter().copied());

            prop_assert_eq!(current_streak(&dates, today()), current_streak(&shuffled, today()));
        }

        #[test]
        fn current_never_exceeds_longest(offsets in prop::collection::vec(0i64..20, 0..30)) {
            let dates: Vec<NaiveDate> = offsets.iter().map(|&n| days_ago(n)).collect();
            prop_assert!(current_streak(&dates, today()) <= longest_run(&dates));
        }
    }
}
