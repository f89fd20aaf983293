//! Habit management commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;
use habitflow_core::habit::{format_countdown, next_occurrence_in};
use habitflow_core::{Clock, Database, Frequency, NewHabit, SystemClock, TimeOfDay};

use super::open_session;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit title
        title: String,
        /// Habit description
        #[arg(long)]
        description: Option<String>,
        /// daily, weekly or monthly (default: daily)
        #[arg(long, default_value = "daily")]
        frequency: Frequency,
        /// Reminder time of day (HH:MM)
        #[arg(long)]
        time: Option<TimeOfDay>,
        /// Color tag
        #[arg(long, default_value = "blue")]
        color: String,
        /// Icon identifier
        #[arg(long)]
        icon: Option<String>,
    },
    /// List habits
    List,
    /// Show one habit with its next reminder countdown
    Show {
        /// Habit ID
        id: String,
    },
    /// Toggle completion for a day (default: today)
    Toggle {
        /// Habit ID
        id: String,
        /// Day to toggle (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a habit
    Delete {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut session = open_session(&db)?;

    match action {
        HabitAction::Add {
            title,
            description,
            frequency,
            time,
            color,
            icon,
        } => {
            let habit = session.add_habit(NewHabit {
                title,
                description,
                frequency,
                time_of_day: time,
                icon,
                color,
            })?;
            println!("Habit created: {}", habit.id);
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List => {
            println!("{}", serde_json::to_string_pretty(session.habits())?);
        }
        HabitAction::Show { id } => match session.habit(&id) {
            Some(habit) => {
                let now = SystemClock.now();
                let mut json = serde_json::to_value(habit)?;
                json["completed_today"] = habit.is_completed_on(now.date_naive()).into();
                if let Some(at) = habit.time_of_day {
                    json["next_in"] = format_countdown(next_occurrence_in(at, now)).into();
                }
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            None => println!("Habit not found: {id}"),
        },
        HabitAction::Toggle { id, date } => {
            let date = date.unwrap_or_else(|| session.today());
            match session.toggle_completion(&id, date)? {
                Some(habit) => {
                    let state = if habit.is_completed_on(date) {
                        "completed"
                    } else {
                        "not completed"
                    };
                    println!("{date}: {state} (streak {})", habit.streak);
                }
                None => println!("Habit not found: {id}"),
            }
        }
        HabitAction::Delete { id } => {
            if session.delete_habit(&id)? {
                println!("Habit deleted: {id}");
            } else {
                println!("Habit not found: {id}");
            }
        }
    }
    Ok(())
}
