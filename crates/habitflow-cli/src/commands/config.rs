//! Config commands for CLI.
//!
//! Keys are dot paths into `config.toml`:
//! `notifications.risk_window_hours`, `notifications.reminder_window_hours`,
//! `notifications.suppress_initial_events`, `ticker.countdown_secs`,
//! `ticker.evaluation_secs`.

use clap::Subcommand;
use habitflow_core::{Config, ConfigError};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one threshold or interval
    Get {
        /// Dot-path key, e.g. "notifications.risk_window_hours"
        key: String,
    },
    /// Change one threshold or interval
    Set {
        /// Dot-path key, e.g. "ticker.evaluation_secs"
        key: String,
        /// Hours, seconds or true/false depending on the key
        value: String,
    },
    /// Print the whole config as TOML
    List,
    /// Restore 6h risk, 2h reminder, 1s/60s ticker and baseline suppression
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            let stored = config.get(&key).unwrap_or(value);
            tracing::info!(%key, value = %stored, "config updated");
            println!("{key} = {stored}");
        }
        ConfigAction::List => {
            println!("{}", toml::to_string_pretty(&Config::load()?)?);
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!(
                "config reset: risk window {}h, reminder window {}h, evaluation every {}s",
                config.notifications.risk_window_hours,
                config.notifications.reminder_window_hours,
                config.ticker.evaluation_secs
            );
        }
    }
    Ok(())
}
