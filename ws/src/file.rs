//! File-backed stores
//!
//! Words live in a JSONL log (one record per line); settings are a single
//! YAML document. The word log is small, so mutations load everything,
//! modify in memory and rewrite the file while holding an advisory lock.

use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use fs2::FileExt;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::settings::NotificationSettings;
use crate::store::{SettingsStore, WordStore};
use crate::word::{NewWord, Word};

const WORDS_FILE: &str = "words.jsonl";
const SETTINGS_FILE: &str = "settings.yml";

/// JSONL-backed word collection
pub struct FileWordStore {
    path: PathBuf,
}

impl FileWordStore {
    /// Open or create a word store inside the given data directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(WORDS_FILE);
        debug!(?path, "opened word store");
        Ok(Self { path })
    }

    /// Run a closure against the locked data file
    fn with_locked_file<T>(&self, op: impl FnOnce(&mut fs::File) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        FileExt::lock_exclusive(&file)?;
        let result = op(&mut file);
        let _ = FileExt::unlock(&file);
        result
    }

    fn read_words(file: &mut fs::File) -> Result<Vec<Word>, StoreError> {
        file.seek(SeekFrom::Start(0))?;
        let reader = BufReader::new(&*file);
        let mut words = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            words.push(serde_json::from_str(&line)?);
        }
        Ok(words)
    }

    fn write_words(file: &mut fs::File, words: &[Word]) -> Result<(), StoreError> {
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        let mut writer = BufWriter::new(&*file);
        for word in words {
            let line = serde_json::to_string(word)?;
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Load, apply a mutation to one word, rewrite
    fn mutate_word<T>(
        &self,
        id: &str,
        op: impl FnOnce(&mut Word) -> T,
    ) -> Result<T, StoreError> {
        self.with_locked_file(|file| {
            let mut words = Self::read_words(file)?;
            let word = words.iter_mut().find(|w| w.id == id).ok_or_else(|| StoreError::NotFound {
                id: id.to_string(),
            })?;
            let result = op(word);
            Self::write_words(file, &words)?;
            Ok(result)
        })
    }
}

#[async_trait]
impl WordStore for FileWordStore {
    async fn create(&self, draft: NewWord) -> Result<String, StoreError> {
        let id = uuid::Uuid::now_v7().to_string();
        let word = draft.into_word(id.clone(), Local::now());
        self.with_locked_file(|file| {
            file.seek(SeekFrom::End(0))?;
            let line = serde_json::to_string(&word)?;
            writeln!(file, "{}", line)?;
            Ok(())
        })?;
        info!(word_id = %id, word = %word.word, "word created");
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Word, StoreError> {
        self.with_locked_file(|file| {
            Self::read_words(file)?
                .into_iter()
                .find(|w| w.id == id)
                .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
        })
    }

    async fn list(&self) -> Result<Vec<Word>, StoreError> {
        let mut words = self.with_locked_file(Self::read_words)?;
        words.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(words)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.with_locked_file(|file| {
            let mut words = Self::read_words(file)?;
            let before = words.len();
            words.retain(|w| w.id != id);
            if words.len() == before {
                return Err(StoreError::NotFound { id: id.to_string() });
            }
            Self::write_words(file, &words)
        })?;
        info!(word_id = %id, "word deleted");
        Ok(())
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<(), StoreError> {
        self.mutate_word(id, |word| word.is_active = active)?;
        debug!(word_id = %id, active, "active flag updated");
        Ok(())
    }

    async fn increment_review(&self, id: &str) -> Result<u32, StoreError> {
        let new_count = self.mutate_word(id, |word| {
            word.review_count += 1;
            word.last_reviewed = Some(Local::now());
            word.review_count
        })?;
        debug!(word_id = %id, review_count = new_count, "review count incremented");
        Ok(new_count)
    }
}

/// YAML-backed settings record
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    /// Open or create a settings store inside the given data directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(SETTINGS_FILE);
        debug!(?path, "opened settings store");
        Ok(Self { path })
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn get(&self) -> Result<NotificationSettings, StoreError> {
        if !self.path.exists() {
            // First-ever use: materialize and persist the default record
            let settings = NotificationSettings::default();
            self.set(&settings).await?;
            info!("materialized default notification settings");
            return Ok(settings);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    async fn set(&self, settings: &NotificationSettings) -> Result<(), StoreError> {
        let yaml = serde_yaml::to_string(settings)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ActiveHours;
    use crate::word::Difficulty;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_and_get() {
        let temp = TempDir::new().unwrap();
        let store = FileWordStore::open(temp.path()).unwrap();

        let id = store
            .create(NewWord::new("serendipity", "a happy accident").with_difficulty(Difficulty::Hard))
            .await
            .unwrap();

        let word = store.get(&id).await.unwrap();
        assert_eq!(word.word, "serendipity");
        assert_eq!(word.difficulty, Difficulty::Hard);
        assert_eq!(word.review_count, 0);
        assert!(word.is_active);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let temp = TempDir::new().unwrap();
        let store = FileWordStore::open(temp.path()).unwrap();

        let err = store.get("no-such-id").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let temp = TempDir::new().unwrap();
        let store = FileWordStore::open(temp.path()).unwrap();

        store.create(NewWord::new("first", "1")).await.unwrap();
        store.create(NewWord::new("second", "2")).await.unwrap();
        store.create(NewWord::new("third", "3")).await.unwrap();

        let words = store.list().await.unwrap();
        assert_eq!(words.len(), 3);
        assert!(words[0].created_at >= words[1].created_at);
        assert!(words[1].created_at >= words[2].created_at);
    }

    #[tokio::test]
    async fn test_list_active_filters() {
        let temp = TempDir::new().unwrap();
        let store = FileWordStore::open(temp.path()).unwrap();

        let active = store.create(NewWord::new("active", "on")).await.unwrap();
        let paused = store.create(NewWord::new("paused", "off").inactive()).await.unwrap();

        let words = store.list_active().await.unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].id, active);

        store.set_active(&paused, true).await.unwrap();
        assert_eq!(store.list_active().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let temp = TempDir::new().unwrap();
        let store = FileWordStore::open(temp.path()).unwrap();

        let id = store.create(NewWord::new("transient", "short-lived")).await.unwrap();
        store.delete(&id).await.unwrap();

        assert!(store.get(&id).await.unwrap_err().is_not_found());
        assert!(store.delete(&id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_increment_review() {
        let temp = TempDir::new().unwrap();
        let store = FileWordStore::open(temp.path()).unwrap();

        let id = store.create(NewWord::new("recur", "happen again")).await.unwrap();

        assert_eq!(store.increment_review(&id).await.unwrap(), 1);
        assert_eq!(store.increment_review(&id).await.unwrap(), 2);

        let word = store.get(&id).await.unwrap();
        assert_eq!(word.review_count, 2);
        assert!(word.last_reviewed.is_some());
    }

    #[tokio::test]
    async fn test_settings_first_use_materializes_default() {
        let temp = TempDir::new().unwrap();
        let store = FileSettingsStore::open(temp.path()).unwrap();

        let settings = store.get().await.unwrap();
        assert_eq!(settings, NotificationSettings::default());

        // The record is now on disk
        assert!(temp.path().join(SETTINGS_FILE).exists());
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = FileSettingsStore::open(temp.path()).unwrap();

        let settings = NotificationSettings {
            enabled: false,
            daily_count: 120,
            active_hours: ActiveHours { start: 7, end: 23 },
            today_count: 11,
            ..Default::default()
        };
        store.set(&settings).await.unwrap();

        let back = store.get().await.unwrap();
        assert_eq!(settings, back);
    }
}
