//! Refresh schedule for long-running front ends.
//!
//! The caller drives a fixed-rate timer at the countdown interval and asks
//! [`Ticker::poll`] what each tick should do. Evaluation passes are
//! idempotent, so a late or skipped tick only delays a threshold crossing.

use chrono::{DateTime, Duration, Utc};

use crate::storage::TickerConfig;

/// Work due on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Redraw countdowns only.
    Countdown,
    /// Re-run the evaluation pass, then redraw.
    Evaluate,
}

#[derive(Debug, Clone)]
pub struct Ticker {
    countdown: Duration,
    evaluation: Duration,
    next_evaluation: Option<DateTime<Utc>>,
}

impl Ticker {
    pub fn new(countdown: Duration, evaluation: Duration) -> Self {
        Self {
            countdown,
            evaluation,
            next_evaluation: None,
        }
    }

    pub fn from_config(cfg: &TickerConfig) -> Self {
        // Clamped to [1s, 1 day].
        let secs = |s: u64| Duration::seconds(s.clamp(1, 86_400) as i64);
        Self::new(secs(cfg.countdown_secs), secs(cfg.evaluation_secs))
    }

    /// Interval of the underlying timer.
    pub fn period(&self) -> std::time::Duration {
        self.countdown
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(1))
    }

    pub fn poll(&mut self, now: DateTime<Utc>) -> Tick {
        match self.next_evaluation {
            Some(due) if now < due => Tick::Countdown,
            _ => {
                self.next_evaluation = Some(now + self.evaluation);
                Tick::Evaluate
            }
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::from_config(&TickerConfig::default())
    }
}
