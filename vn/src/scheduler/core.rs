//! Notification scheduler
//!
//! Owns one timer chain per active word. A chain computes a jittered
//! delay, sleeps, re-validates the send conditions and either presents a
//! notification or retries; it keeps re-arming itself until the word is
//! canceled, deactivated or deleted. Chains for different words interleave
//! freely; the settings cache is shared without being held across awaits,
//! so two chains may transiently overshoot the daily quota by a small
//! margin. That imprecision is accepted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use wordstore::{NotificationSettings, SettingsStore, Word, WordStore};

use crate::clock::Clock;
use crate::events::{Event, EventBus};
use crate::notify::{NotificationRequest, Notifier, NotifyError, Permission, Presentation};

use super::delay::calculate_delay;

/// Pause between a confirmed display and the next delay computation
pub const COOL_DOWN: Duration = Duration::from_secs(30);
/// Retry pause when the send conditions do not hold at expiry
pub const CONDITION_RETRY: Duration = Duration::from_secs(5 * 60);
/// Retry pause after a display error
pub const ERROR_RETRY: Duration = Duration::from_secs(10 * 60);
/// How long a presented notification stays on screen
pub const AUTO_DISMISS: Duration = Duration::from_secs(15);
/// Upper bound of the random initial stagger applied by `schedule_all`
pub const MAX_INITIAL_STAGGER: Duration = Duration::from_secs(5 * 60);

/// Collaborators and shared state the chains run against
struct ChainCtx {
    settings: Mutex<NotificationSettings>,
    words: Arc<dyn WordStore>,
    settings_store: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
    events: Arc<EventBus>,
    clock: Arc<dyn Clock>,
}

/// Per-word notification timer owner
///
/// All collaborators are injected; the scheduler is the only owner of the
/// timer table and the only component allowed to abort chains.
pub struct NotificationScheduler {
    ctx: Arc<ChainCtx>,
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl NotificationScheduler {
    /// Create a scheduler with built-in default settings
    pub fn new(
        words: Arc<dyn WordStore>,
        settings_store: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
        events: Arc<EventBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ctx: Arc::new(ChainCtx {
                settings: Mutex::new(NotificationSettings::default()),
                words,
                settings_store,
                notifier,
                events,
                clock,
            }),
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Create a scheduler and load settings from the store, best-effort
    pub async fn connect(
        words: Arc<dyn WordStore>,
        settings_store: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
        events: Arc<EventBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let scheduler = Self::new(words, settings_store, notifier, events, clock);
        scheduler.refresh_settings().await;
        scheduler
    }

    /// Refresh the settings cache from the store
    ///
    /// Best-effort: on failure the current cache (built-in defaults at
    /// construction) is retained.
    pub async fn refresh_settings(&self) {
        match self.ctx.settings_store.get().await {
            Ok(stored) => {
                let mut settings = self.ctx.settings.lock().await;
                *settings = stored;
                settings.reset_if_stale(self.ctx.clock.today());
            }
            Err(err) => {
                warn!(error = %err, "failed to load settings, keeping current cache");
            }
        }
    }

    /// Arm the timer chain for one word
    ///
    /// No-op for inactive words. Any existing chain for the id is aborted
    /// first, so at most one chain per word exists at any time.
    pub async fn schedule_one(&self, word: Word) {
        if !word.is_active {
            debug!(word_id = %word.id, word = %word.word, "schedule_one: word inactive, skipping");
            return;
        }
        self.arm(word, Duration::ZERO).await;
    }

    /// Cancel everything, reset quota state and arm every active word
    ///
    /// Each chain starts with an independent random stagger in
    /// `[0, 5 minutes)` so a bulk (re)load does not fire a synchronized
    /// burst.
    pub async fn schedule_all(&self, words: &[Word]) {
        self.cancel_all().await;
        {
            let mut settings = self.ctx.settings.lock().await;
            settings.reset_if_stale(self.ctx.clock.today());
        }

        let active: Vec<Word> = words.iter().filter(|w| w.is_active).cloned().collect();
        if active.is_empty() {
            info!("schedule_all: no active words to schedule");
            return;
        }

        info!(count = active.len(), "schedule_all: arming timer chains");
        let mut rng = StdRng::from_os_rng();
        for word in active {
            let stagger = Duration::from_millis(rng.random_range(0..MAX_INITIAL_STAGGER.as_millis() as u64));
            debug!(word_id = %word.id, stagger_secs = stagger.as_secs(), "schedule_all: staggered start");
            self.arm(word, stagger).await;
        }
    }

    /// Cancel the chain for one word, if present; idempotent
    pub async fn cancel(&self, word_id: &str) {
        let mut timers = self.timers.lock().await;
        if let Some(handle) = timers.remove(word_id) {
            handle.abort();
            debug!(word_id, "cancel: timer chain aborted");
        }
    }

    /// Cancel every chain and clear the table; idempotent
    pub async fn cancel_all(&self) {
        let mut timers = self.timers.lock().await;
        let count = timers.len();
        for (_, handle) in timers.drain() {
            handle.abort();
        }
        if count > 0 {
            debug!(count, "cancel_all: aborted timer chains");
        }
    }

    /// Replace the cached settings and cancel all chains
    ///
    /// Callers re-invoke [`schedule_all`](Self::schedule_all) with the
    /// current word list; the scheduler does not retain it.
    pub async fn apply_settings(&self, new_settings: NotificationSettings) {
        info!(
            enabled = new_settings.enabled,
            daily_count = new_settings.daily_count,
            start = new_settings.active_hours.start,
            end = new_settings.active_hours.end,
            "apply_settings: replacing settings cache"
        );
        let snapshot = {
            let mut settings = self.ctx.settings.lock().await;
            *settings = new_settings;
            settings.reset_if_stale(self.ctx.clock.today());
            settings.clone()
        };
        self.cancel_all().await;
        self.ctx.events.emit(Event::SettingsApplied { settings: snapshot });
    }

    /// Read-only snapshot of the cached settings
    pub async fn get_settings(&self) -> NotificationSettings {
        self.ctx.settings.lock().await.clone()
    }

    /// Number of live timer chains
    pub async fn timer_count(&self) -> usize {
        self.timers.lock().await.len()
    }

    async fn arm(&self, word: Word, stagger: Duration) {
        let mut timers = self.timers.lock().await;
        if let Some(old) = timers.remove(&word.id) {
            old.abort();
            debug!(word_id = %word.id, "arm: replaced existing timer chain");
        }
        let ctx = Arc::clone(&self.ctx);
        let id = word.id.clone();
        let handle = tokio::spawn(run_chain(ctx, word, stagger));
        timers.insert(id, handle);
    }
}

/// The per-word timer chain
///
/// Three-branch continuation after each expiry: display attempt returned
/// (cool-down), conditions failed (condition retry), display errored
/// (error retry). No branch exits the loop; cancellation is the only way
/// a chain ends.
async fn run_chain(ctx: Arc<ChainCtx>, word: Word, stagger: Duration) {
    let mut rng = StdRng::from_os_rng();

    if !stagger.is_zero() {
        tokio::time::sleep(stagger).await;
    }

    loop {
        let delay = {
            let settings = ctx.settings.lock().await;
            calculate_delay(ctx.clock.now(), &settings, &mut rng)
        };
        debug!(word_id = %word.id, word = %word.word, delay_secs = delay.as_secs(), "chain: armed");
        tokio::time::sleep(delay).await;

        // Re-validate at expiry: settings may have rolled over or changed
        // while we slept
        let sendable = {
            let mut settings = ctx.settings.lock().await;
            settings.reset_if_stale(ctx.clock.today());
            can_send(&settings, ctx.clock.now())
        };

        if !(sendable && word.is_active) {
            debug!(
                word_id = %word.id,
                retry_secs = CONDITION_RETRY.as_secs(),
                "chain: send conditions not met at expiry"
            );
            tokio::time::sleep(CONDITION_RETRY).await;
            continue;
        }

        match display_and_count(&ctx, &word).await {
            Ok(Presentation::Displayed) => {
                debug!(word_id = %word.id, "chain: notification displayed, cooling down");
                tokio::time::sleep(COOL_DOWN).await;
            }
            Ok(Presentation::Skipped) => {
                debug!(word_id = %word.id, "chain: notification skipped, cooling down");
                tokio::time::sleep(COOL_DOWN).await;
            }
            Err(err) => {
                warn!(
                    word_id = %word.id,
                    error = %err,
                    retry_secs = ERROR_RETRY.as_secs(),
                    "chain: display failed"
                );
                tokio::time::sleep(ERROR_RETRY).await;
            }
        }
    }
}

/// True iff notifications are enabled, quota remains and the current hour
/// is inside the active window. The caller resets stale quota state under
/// the same lock before calling.
fn can_send(settings: &NotificationSettings, now: chrono::DateTime<chrono::Local>) -> bool {
    use chrono::Timelike;
    settings.enabled && settings.remaining_today() > 0 && settings.active_hours.contains(now.hour())
}

/// Attempt to display a notification and account for it
///
/// A permission problem is not an error: the attempt is counted against
/// today's quota and reported as `Skipped`. A confirmed display
/// additionally bumps the word's review count and publishes events.
async fn display_and_count(ctx: &ChainCtx, word: &Word) -> Result<Presentation, NotifyError> {
    let presentation = attempt_display(ctx, word).await?;

    // Count the attempt against today's quota; on a storage failure keep
    // the local increment so the cache stays ahead, never behind
    let (snapshot, today_count) = {
        let mut settings = ctx.settings.lock().await;
        settings.today_count += 1;
        settings.last_reset_date = ctx.clock.today();
        (settings.clone(), settings.today_count)
    };
    if let Err(err) = ctx.settings_store.set(&snapshot).await {
        warn!(word_id = %word.id, error = %err, "failed to persist today count");
    }

    if presentation == Presentation::Skipped {
        return Ok(Presentation::Skipped);
    }

    let sent_at = ctx.clock.now();
    ctx.events.emit(Event::NotificationSent {
        word_id: word.id.clone(),
        word: word.word.clone(),
        meaning: word.meaning.clone(),
        sent_at,
        today_count,
    });

    match ctx.words.increment_review(&word.id).await {
        Ok(review_count) => {
            ctx.events.emit(Event::ReviewIncremented {
                word_id: word.id.clone(),
                review_count,
                reviewed_at: sent_at,
            });
        }
        Err(err) => {
            warn!(word_id = %word.id, error = %err, "failed to increment review count");
        }
    }

    Ok(Presentation::Displayed)
}

/// Resolve permission and present; `Skipped` when permission is missing
async fn attempt_display(ctx: &ChainCtx, word: &Word) -> Result<Presentation, NotifyError> {
    let permission = match ctx.notifier.permission() {
        Permission::Granted => Permission::Granted,
        Permission::Denied => {
            debug!(word_id = %word.id, "display: permission denied");
            return Ok(Presentation::Skipped);
        }
        Permission::Unset => ctx.notifier.request_permission().await,
    };
    if permission != Permission::Granted {
        debug!(word_id = %word.id, "display: permission not granted");
        return Ok(Presentation::Skipped);
    }

    let request = NotificationRequest::for_word(word, AUTO_DISMISS);
    ctx.notifier.present(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::mock::ManualClock;
    use crate::notify::mock::RecordingNotifier;
    use chrono::{Local, TimeZone};
    use wordstore::{ActiveHours, MemorySettingsStore, MemoryWordStore, NewWord};

    struct Harness {
        scheduler: NotificationScheduler,
        words: Arc<MemoryWordStore>,
        settings_store: Arc<MemorySettingsStore>,
        notifier: Arc<RecordingNotifier>,
        events: Arc<EventBus>,
        clock: Arc<ManualClock>,
    }

    fn harness(settings: NotificationSettings, permission: Permission) -> Harness {
        let words = Arc::new(MemoryWordStore::new());
        let settings_store = Arc::new(MemorySettingsStore::with_settings(settings.clone()));
        let notifier = Arc::new(RecordingNotifier::with_permission(permission));
        let events = Arc::new(EventBus::with_default_capacity());
        let clock = Arc::new(ManualClock::at(
            Local.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap(),
        ));

        let scheduler = NotificationScheduler::new(
            words.clone(),
            settings_store.clone(),
            notifier.clone(),
            events.clone(),
            clock.clone(),
        );

        Harness {
            scheduler,
            words,
            settings_store,
            notifier,
            events,
            clock,
        }
    }

    /// Wide window and generous quota so chain delays stay short
    fn fast_settings() -> NotificationSettings {
        NotificationSettings {
            enabled: true,
            daily_count: 500,
            active_hours: ActiveHours { start: 0, end: 23 },
            last_reset_date: Local.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap().date_naive(),
            today_count: 0,
        }
    }

    async fn seeded_word(h: &Harness, text: &str) -> Word {
        let id = h.words.create(NewWord::new(text, "meaning")).await.unwrap();
        h.words.get(&id).await.unwrap()
    }

    #[tokio::test]
    async fn test_schedule_one_inactive_is_noop() {
        let h = harness(fast_settings(), Permission::Granted);
        h.scheduler.refresh_settings().await;

        let id = h.words.create(NewWord::new("idle", "m").inactive()).await.unwrap();
        let word = h.words.get(&id).await.unwrap();

        h.scheduler.schedule_one(word).await;
        assert_eq!(h.scheduler.timer_count().await, 0);
    }

    #[tokio::test]
    async fn test_at_most_one_chain_per_word() {
        let h = harness(fast_settings(), Permission::Granted);
        h.scheduler.refresh_settings().await;
        let word = seeded_word(&h, "repeat").await;

        h.scheduler.schedule_one(word.clone()).await;
        h.scheduler.schedule_one(word.clone()).await;
        h.scheduler.schedule_one(word).await;

        assert_eq!(h.scheduler.timer_count().await, 1);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let h = harness(fast_settings(), Permission::Granted);
        h.scheduler.refresh_settings().await;
        let word = seeded_word(&h, "gone").await;

        h.scheduler.schedule_one(word.clone()).await;
        assert_eq!(h.scheduler.timer_count().await, 1);

        h.scheduler.cancel(&word.id).await;
        assert_eq!(h.scheduler.timer_count().await, 0);

        // Second cancel: no error, no change
        h.scheduler.cancel(&word.id).await;
        assert_eq!(h.scheduler.timer_count().await, 0);
    }

    #[tokio::test]
    async fn test_schedule_all_empty_list() {
        let h = harness(fast_settings(), Permission::Granted);
        h.scheduler.schedule_all(&[]).await;
        assert_eq!(h.scheduler.timer_count().await, 0);
    }

    #[tokio::test]
    async fn test_schedule_all_filters_inactive() {
        let h = harness(fast_settings(), Permission::Granted);
        h.scheduler.refresh_settings().await;

        let active = seeded_word(&h, "active").await;
        let id = h.words.create(NewWord::new("paused", "m").inactive()).await.unwrap();
        let inactive = h.words.get(&id).await.unwrap();

        h.scheduler.schedule_all(&[active, inactive]).await;
        assert_eq!(h.scheduler.timer_count().await, 1);
    }

    #[tokio::test]
    async fn test_apply_settings_cancels_all_chains() {
        let h = harness(fast_settings(), Permission::Granted);
        h.scheduler.refresh_settings().await;

        let a = seeded_word(&h, "alpha").await;
        let b = seeded_word(&h, "beta").await;
        h.scheduler.schedule_all(&[a, b]).await;
        assert_eq!(h.scheduler.timer_count().await, 2);

        let mut rx = h.events.subscribe();
        let mut new_settings = fast_settings();
        new_settings.daily_count = 3;
        h.scheduler.apply_settings(new_settings).await;

        assert_eq!(h.scheduler.timer_count().await, 0);
        assert_eq!(h.scheduler.get_settings().await.daily_count, 3);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "SettingsApplied");
    }

    #[tokio::test(start_paused = true)]
    async fn test_chain_displays_counts_and_broadcasts() {
        let h = harness(fast_settings(), Permission::Granted);
        h.scheduler.refresh_settings().await;
        let word = seeded_word(&h, "ubiquitous").await;

        let mut rx = h.events.subscribe();
        h.scheduler.schedule_one(word.clone()).await;

        let sent = tokio::time::timeout(Duration::from_secs(24 * 3600), rx.recv())
            .await
            .expect("expected a notification before the timeout")
            .unwrap();
        match sent {
            Event::NotificationSent { word_id, today_count, .. } => {
                assert_eq!(word_id, word.id);
                assert_eq!(today_count, 1);
            }
            other => panic!("expected NotificationSent, got {:?}", other),
        }

        let reviewed = tokio::time::timeout(Duration::from_secs(60), rx.recv())
            .await
            .expect("expected a review event")
            .unwrap();
        match reviewed {
            Event::ReviewIncremented { word_id, review_count, .. } => {
                assert_eq!(word_id, word.id);
                assert_eq!(review_count, 1);
            }
            other => panic!("expected ReviewIncremented, got {:?}", other),
        }

        // Quota bookkeeping was persisted and the review landed in the store
        assert_eq!(h.scheduler.get_settings().await.today_count, 1);
        assert_eq!(h.settings_store.get().await.unwrap().today_count, 1);
        assert_eq!(h.words.get(&word.id).await.unwrap().review_count, 1);
        assert_eq!(h.notifier.present_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_denied_consumes_quota_without_display() {
        let h = harness(fast_settings(), Permission::Denied);
        h.scheduler.refresh_settings().await;
        let word = seeded_word(&h, "muted").await;

        h.scheduler.schedule_one(word.clone()).await;

        // Let several cycles elapse
        tokio::time::sleep(Duration::from_secs(3600)).await;

        assert_eq!(h.notifier.present_count(), 0);
        assert!(h.scheduler.get_settings().await.today_count >= 1);
        assert_eq!(h.words.get(&word.id).await.unwrap().review_count, 0);
        // The chain stays alive
        assert_eq!(h.scheduler.timer_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_error_does_not_count_or_kill_chain() {
        let h = harness(fast_settings(), Permission::Granted);
        h.scheduler.refresh_settings().await;
        h.notifier.fail_displays("renderer gone");
        let word = seeded_word(&h, "broken").await;

        h.scheduler.schedule_one(word.clone()).await;
        tokio::time::sleep(Duration::from_secs(3600)).await;

        assert_eq!(h.scheduler.get_settings().await.today_count, 0);
        assert_eq!(h.words.get(&word.id).await.unwrap().review_count, 0);
        assert_eq!(h.scheduler.timer_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_outside_window_never_sends() {
        let mut settings = fast_settings();
        settings.active_hours = ActiveHours { start: 9, end: 22 };
        let h = harness(settings, Permission::Granted);
        h.scheduler.refresh_settings().await;
        h.clock.set(Local.with_ymd_and_hms(2025, 6, 2, 23, 0, 0).unwrap());

        let word = seeded_word(&h, "night").await;
        h.scheduler.schedule_one(word).await;

        // The wall clock never reaches the window (the mock stays at 23:00),
        // so even hours of tokio time produce no sends
        tokio::time::sleep(Duration::from_secs(12 * 3600)).await;

        assert_eq!(h.notifier.present_count(), 0);
        assert_eq!(h.scheduler.get_settings().await.today_count, 0);
    }

    #[tokio::test]
    async fn test_refresh_settings_falls_back_on_defaults() {
        // A store that was never written serves defaults; the cache matches
        let h = harness(NotificationSettings::default(), Permission::Granted);
        h.scheduler.refresh_settings().await;
        assert_eq!(h.scheduler.get_settings().await.daily_count, 10);
    }
}
