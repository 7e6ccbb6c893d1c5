//! In-process stores
//!
//! Used by tests and by ephemeral runs that do not want anything on disk.
//! Same contracts as the file-backed stores.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Local;

use crate::error::StoreError;
use crate::settings::NotificationSettings;
use crate::store::{SettingsStore, WordStore};
use crate::word::{NewWord, Word};

/// Mutex-guarded in-memory word collection
#[derive(Default)]
pub struct MemoryWordStore {
    words: Mutex<Vec<Word>>,
}

impl MemoryWordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Word>> {
        // A poisoned lock only happens after a panic in another test thread
        self.words.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl WordStore for MemoryWordStore {
    async fn create(&self, draft: NewWord) -> Result<String, StoreError> {
        let id = uuid::Uuid::now_v7().to_string();
        let word = draft.into_word(id.clone(), Local::now());
        self.lock().push(word);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Word, StoreError> {
        self.lock()
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn list(&self) -> Result<Vec<Word>, StoreError> {
        let mut words = self.lock().clone();
        words.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(words)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut words = self.lock();
        let before = words.len();
        words.retain(|w| w.id != id);
        if words.len() == before {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<(), StoreError> {
        let mut words = self.lock();
        let word = words.iter_mut().find(|w| w.id == id).ok_or_else(|| StoreError::NotFound {
            id: id.to_string(),
        })?;
        word.is_active = active;
        Ok(())
    }

    async fn increment_review(&self, id: &str) -> Result<u32, StoreError> {
        let mut words = self.lock();
        let word = words.iter_mut().find(|w| w.id == id).ok_or_else(|| StoreError::NotFound {
            id: id.to_string(),
        })?;
        word.review_count += 1;
        word.last_reviewed = Some(Local::now());
        Ok(word.review_count)
    }
}

/// Mutex-guarded in-memory settings record
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Option<NotificationSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: NotificationSettings) -> Self {
        Self {
            settings: Mutex::new(Some(settings)),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self) -> Result<NotificationSettings, StoreError> {
        let mut guard = self.settings.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.get_or_insert_with(NotificationSettings::default).clone())
    }

    async fn set(&self, settings: &NotificationSettings) -> Result<(), StoreError> {
        let mut guard = self.settings.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(settings.clone());
        Ok(())
    }
}
