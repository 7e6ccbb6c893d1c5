//! Event types for scheduler activity
//!
//! These events carry everything the legacy cross-view broadcast keys did
//! (last notification time and word, updated word id and review count),
//! delivered push-style instead of being polled.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use wordstore::NotificationSettings;

/// Observable scheduler activity
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A notification was displayed for a word
    NotificationSent {
        word_id: String,
        word: String,
        meaning: String,
        sent_at: DateTime<Local>,
        /// Quota consumed so far today, including this send
        today_count: u32,
    },

    /// A word's review count changed
    ReviewIncremented {
        word_id: String,
        review_count: u32,
        reviewed_at: DateTime<Local>,
    },

    /// The scheduler accepted a new settings record
    SettingsApplied { settings: NotificationSettings },
}

impl Event {
    /// Event type name for logging and filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::NotificationSent { .. } => "NotificationSent",
            Event::ReviewIncremented { .. } => "ReviewIncremented",
            Event::SettingsApplied { .. } => "SettingsApplied",
        }
    }

    /// The word this event concerns, if any
    pub fn word_id(&self) -> Option<&str> {
        match self {
            Event::NotificationSent { word_id, .. } => Some(word_id),
            Event::ReviewIncremented { word_id, .. } => Some(word_id),
            Event::SettingsApplied { .. } => None,
        }
    }
}
