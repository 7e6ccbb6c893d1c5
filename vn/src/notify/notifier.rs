//! Notifier trait definition

use std::time::Duration;

use async_trait::async_trait;

use wordstore::Word;

use super::NotifyError;

/// Tri-state notification permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// The user has not decided yet
    Unset,
    Granted,
    Denied,
}

/// What to present
///
/// The `tag` deduplicates: presenting a request with the tag of a
/// notification that is still on screen replaces it, so at most one
/// notification per word is ever visible.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub tag: String,
    /// How long the notification stays on screen before auto-dismissing
    pub auto_dismiss: Duration,
}

impl NotificationRequest {
    /// Build the reminder request for a word
    pub fn for_word(word: &Word, auto_dismiss: Duration) -> Self {
        Self {
            title: "Word reminder".to_string(),
            body: format!("{}: {}", word.word, word.meaning),
            tag: format!("word-{}", word.id),
            auto_dismiss,
        }
    }
}

/// Outcome of a non-erroring presentation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// The notification was confirmed on screen
    Displayed,
    /// The platform accepted the call but suppressed the notification
    Skipped,
}

/// Host notification capability
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Current permission state, without prompting the user
    fn permission(&self) -> Permission;

    /// Ask the user for permission; returns the resulting state
    async fn request_permission(&self) -> Permission;

    /// Present a notification
    ///
    /// `Ok(Displayed)` means the notification was confirmed on screen;
    /// implementations must only return that once display actually
    /// happened, since the caller counts reviews off it.
    async fn present(&self, request: NotificationRequest) -> Result<Presentation, NotifyError>;
}
