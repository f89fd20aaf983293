//! # HabitFlow Core Library
//!
//! This library provides the core logic of the HabitFlow habit tracker. All
//! operations are available through the standalone CLI binary; any other
//! front end is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Streak Engine**: pure computation of the current consecutive-day
//!   streak from a set of completion dates
//! - **Notification Engine**: event detection across evaluation passes,
//!   clock-derived risk and reminder notifications, persisted read state
//! - **Storage**: a synchronous key-value port with SQLite and in-memory
//!   implementations, plus TOML configuration
//! - **Session**: habit mutators that re-run the notification pass
//!
//! ## Key Components
//!
//! - [`HabitSession`]: habit mutations plus the notification feed
//! - [`NotificationEngine`]: evaluation passes and read state
//! - [`compute_streak`]: the streak function
//! - [`KvStore`]: persistence port
//! - [`Clock`]: wall-clock port

pub mod auth;
pub mod clock;
pub mod error;
pub mod habit;
pub mod notification;
pub mod session;
pub mod storage;
pub mod ticker;

pub use auth::{AuthStore, ProfileUpdate, User};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, ConfigError, CoreError, Result, StorageError, ValidationError};
pub use habit::{compute_streak, Frequency, Habit, HabitStore, NewHabit, TimeOfDay, UserStats};
pub use notification::{
    Notification, NotificationEngine, NotificationSettings, NotificationType, Priority,
};
pub use session::HabitSession;
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use ticker::{Tick, Ticker};
