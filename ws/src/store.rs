//! Storage trait seams consumed by the scheduler

use async_trait::async_trait;

use crate::error::StoreError;
use crate::settings::NotificationSettings;
use crate::word::{NewWord, Word};

/// Durable collection of word records
///
/// All operations are asynchronous and may fail with a [`StoreError`].
/// Implementations must be safe to share behind an `Arc` across tasks.
#[async_trait]
pub trait WordStore: Send + Sync {
    /// Persist a draft and return the assigned id
    async fn create(&self, draft: NewWord) -> Result<String, StoreError>;

    /// Fetch one word by id
    async fn get(&self, id: &str) -> Result<Word, StoreError>;

    /// All words, newest first
    async fn list(&self) -> Result<Vec<Word>, StoreError>;

    /// Active words, newest first
    async fn list_active(&self) -> Result<Vec<Word>, StoreError> {
        Ok(self.list().await?.into_iter().filter(|w| w.is_active).collect())
    }

    /// Delete a word by id
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Flip the active flag
    async fn set_active(&self, id: &str, active: bool) -> Result<(), StoreError>;

    /// Increment the review count, stamp `last_reviewed`, return the new count
    async fn increment_review(&self, id: &str) -> Result<u32, StoreError>;
}

/// Durable singleton record of notification preferences
///
/// `get` on a store that has never been written must materialize and
/// persist the default record.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self) -> Result<NotificationSettings, StoreError>;

    async fn set(&self, settings: &NotificationSettings) -> Result<(), StoreError>;
}
