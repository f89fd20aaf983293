pub mod auth;
pub mod config;
pub mod habit;
pub mod notify;
pub mod stats;

use habitflow_core::{Config, Database, HabitSession, NotificationSettings, SystemClock};

/// Open the session over the on-disk database with configured thresholds.
///
/// Opening runs the baseline pass, so a mutation made afterwards in the
/// same process is observed as a transition.
pub fn open_session(
    db: &Database,
) -> Result<HabitSession<&Database, SystemClock>, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let settings = NotificationSettings::from(&config.notifications);
    Ok(HabitSession::open(db, SystemClock, settings)?)
}
