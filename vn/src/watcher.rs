//! Store watcher
//!
//! There is no push channel from the stores to the scheduler: another
//! process (or another view) may rewrite the settings record or the word
//! list at any time. The watcher polls on a fixed interval and re-arms the
//! scheduler when either the stored preference fields differ from the
//! cache or the set of active words changed.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use tracing::{debug, error, info};

use wordstore::{SettingsStore, WordStore};

use crate::scheduler::NotificationScheduler;

/// Default poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polls the stores and keeps the scheduler in sync
pub struct SettingsWatcher {
    scheduler: Arc<NotificationScheduler>,
    words: Arc<dyn WordStore>,
    settings_store: Arc<dyn SettingsStore>,
    poll_interval: Duration,
    last_active_ids: Option<BTreeSet<String>>,
}

impl SettingsWatcher {
    pub fn new(
        scheduler: Arc<NotificationScheduler>,
        words: Arc<dyn WordStore>,
        settings_store: Arc<dyn SettingsStore>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            scheduler,
            words,
            settings_store,
            poll_interval,
            last_active_ids: None,
        }
    }

    /// Run a single poll cycle
    ///
    /// Returns true when a change was detected and the scheduler re-armed.
    /// The first cycle only records the current active-word set; word
    /// chains armed at startup are left alone.
    pub async fn check_once(&mut self) -> Result<bool> {
        let stored = self.settings_store.get().await?;
        let cached = self.scheduler.get_settings().await;
        let settings_changed = !stored.same_preferences(&cached);

        let words = self.words.list().await?;
        let active_ids: BTreeSet<String> = words
            .iter()
            .filter(|w| w.is_active)
            .map(|w| w.id.clone())
            .collect();
        let words_changed = self
            .last_active_ids
            .as_ref()
            .is_some_and(|last| *last != active_ids);
        let first_cycle = self.last_active_ids.is_none();
        self.last_active_ids = Some(active_ids);

        if settings_changed {
            info!(
                daily_count = stored.daily_count,
                enabled = stored.enabled,
                "settings changed, re-applying and re-arming"
            );
            self.scheduler.apply_settings(stored).await;
            self.scheduler.schedule_all(&words).await;
            return Ok(true);
        }

        if words_changed {
            info!(active = words.iter().filter(|w| w.is_active).count(), "word list changed, re-arming");
            self.scheduler.schedule_all(&words).await;
            return Ok(true);
        }

        if first_cycle {
            debug!("recorded initial active-word set");
        } else {
            debug!("stores unchanged");
        }
        Ok(false)
    }

    /// Run the watcher loop
    ///
    /// Poll errors are logged and do not stop the loop.
    pub async fn run(mut self) {
        info!(interval_secs = self.poll_interval.as_secs(), "store watcher started");
        loop {
            if let Err(err) = self.check_once().await {
                error!(error = %err, "store poll failed");
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
