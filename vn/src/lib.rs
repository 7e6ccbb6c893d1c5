//! Vocabnotify - spaced vocabulary reminders
//!
//! Users add words with meanings; the scheduler surfaces reminders for
//! each active word at jittered intervals, subject to a daily quota and an
//! allowed time-of-day window, adapting to live settings changes.
//!
//! # Modules
//!
//! - [`scheduler`] - per-word timer chains and the delay policy
//! - [`notify`] - platform notification capability trait
//! - [`events`] - pub/sub bus for scheduler activity
//! - [`watcher`] - settings store poller
//! - [`clock`] - injectable wall-clock seam
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface
//!
//! Word and settings storage live in the `wordstore` crate; every
//! collaborator reaches the scheduler by constructor injection.

pub mod cli;
pub mod clock;
pub mod config;
pub mod events;
pub mod notify;
pub mod scheduler;
pub mod watcher;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use config::{Config, StorageConfig, WatcherConfig};
pub use events::{Event, EventBus};
pub use notify::{ConsoleNotifier, NotificationRequest, Notifier, NotifyError, Permission, Presentation};
pub use scheduler::{
    AUTO_DISMISS, CONDITION_RETRY, COOL_DOWN, ERROR_RETRY, MAX_INITIAL_STAGGER, NotificationScheduler,
    calculate_delay,
};
pub use watcher::SettingsWatcher;
