//! Wordstore - durable storage for vocabulary words and notification settings
//!
//! This crate owns the domain records of the vocabulary trainer (words and
//! the per-user notification settings) and the storage seams the scheduler
//! consumes:
//!
//! - [`WordStore`] / [`SettingsStore`] - async traits, injected as
//!   `Arc<dyn ...>` collaborators
//! - [`FileWordStore`] / [`FileSettingsStore`] - file-backed implementations
//!   (JSONL word log, YAML settings record) guarded by an advisory lock
//! - [`MemoryWordStore`] / [`MemorySettingsStore`] - in-process
//!   implementations for tests and ephemeral runs
//!
//! Consumers never own the records: they receive snapshots and write back
//! through the traits.

pub mod error;
pub mod file;
pub mod memory;
pub mod settings;
pub mod store;
pub mod word;

pub use error::StoreError;
pub use file::{FileSettingsStore, FileWordStore};
pub use memory::{MemorySettingsStore, MemoryWordStore};
pub use settings::{ActiveHours, MAX_DAILY_COUNT, MIN_DAILY_COUNT, NotificationSettings};
pub use store::{SettingsStore, WordStore};
pub use word::{Difficulty, NewWord, Word};
