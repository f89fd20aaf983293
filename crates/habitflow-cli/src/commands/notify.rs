//! Notification feed commands for CLI.

use chrono::{DateTime, FixedOffset, Utc};
use clap::Subcommand;
use habitflow_core::habit::{format_countdown, next_occurrence_in};
use habitflow_core::{Clock, Config, Database, Habit, Notification, SystemClock, Tick, Ticker};

use super::open_session;

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Show the feed, newest first
    List {
        /// Only unread entries
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification read
    Read {
        /// Notification ID
        id: String,
    },
    /// Mark everything read
    ReadAll,
    /// Keep re-evaluating and print feed changes and reminder countdowns
    Watch {
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
    },
}

pub fn run(action: NotifyAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut session = open_session(&db)?;

    match action {
        NotifyAction::List { unread } => {
            let feed: Vec<&Notification> =
                session.feed().iter().filter(|n| !unread || !n.read).collect();
            println!("{}", serde_json::to_string_pretty(&feed)?);
            eprintln!("{} unread", session.unread_count());
        }
        NotifyAction::Read { id } => {
            session.mark_as_read(&id)?;
            println!("ok ({} unread)", session.unread_count());
        }
        NotifyAction::ReadAll => {
            session.mark_all_as_read()?;
            println!("ok ({} unread)", session.unread_count());
        }
        NotifyAction::Watch { ticks } => {
            let mut ticker = Ticker::from_config(&Config::load_or_default().ticker);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;

            runtime.block_on(async {
                let mut interval = tokio::time::interval(ticker.period());
                let mut last_unread = None;
                let mut count = 0u64;

                loop {
                    interval.tick().await;
                    if ticker.poll(Utc::now()) == Tick::Evaluate {
                        // Other invocations may have written the slots since the last pass.
                        tracing::debug!("ticker: reloading habits and re-evaluating");
                        session.refresh()?;
                    }

                    let unread = session.unread_count();
                    if last_unread != Some(unread) {
                        println!("{unread} unread");
                        for n in session.feed().iter().filter(|n| !n.read) {
                            println!("  [{}] {}: {}", n.id, n.title, n.message);
                        }
                        last_unread = Some(unread);
                    }

                    let now = SystemClock.now();
                    let countdowns = countdown_line(session.habits(), now);
                    if !countdowns.is_empty() {
                        eprint!("\r{countdowns}  ");
                    }

                    count += 1;
                    if ticks.is_some_and(|limit| count >= limit) {
                        break;
                    }
                }
                Ok::<(), Box<dyn std::error::Error>>(())
            })?;
        }
    }
    Ok(())
}

/// Countdowns to the next slot of every habit already done today, joined
/// into one status line.
fn countdown_line(habits: &[Habit], now: DateTime<FixedOffset>) -> String {
    habits
        .iter()
        .filter(|h| h.is_completed_on(now.date_naive()))
        .filter_map(|h| {
            let at = h.time_of_day?;
            Some(format!(
                "{}: next in {}",
                h.title,
                format_countdown(next_occurrence_in(at, now))
            ))
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
