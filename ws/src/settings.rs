//! Notification settings record

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Smallest accepted daily notification quota
pub const MIN_DAILY_COUNT: u32 = 1;
/// Largest accepted daily notification quota
pub const MAX_DAILY_COUNT: u32 = 1000;

/// Daily time-of-day window during which notifications may fire
///
/// Hours are local wall-clock hours; the window covers `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveHours {
    pub start: u32,
    pub end: u32,
}

impl ActiveHours {
    /// Check whether a wall-clock hour falls inside the window
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start && hour < self.end
    }
}

impl Default for ActiveHours {
    fn default() -> Self {
        Self { start: 9, end: 22 }
    }
}

/// Per-user notification preferences plus today's quota bookkeeping
///
/// Singleton record: there is exactly one per settings store. The
/// preference fields (`enabled`, `daily_count`, `active_hours`) are edited
/// by the user; `last_reset_date` and `today_count` are maintained by the
/// scheduler and reset when the calendar date rolls over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,

    #[serde(rename = "daily-count")]
    pub daily_count: u32,

    #[serde(rename = "active-hours")]
    pub active_hours: ActiveHours,

    #[serde(rename = "last-reset-date")]
    pub last_reset_date: NaiveDate,

    #[serde(rename = "today-count")]
    pub today_count: u32,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            daily_count: 10,
            active_hours: ActiveHours::default(),
            last_reset_date: Local::now().date_naive(),
            today_count: 0,
        }
    }
}

impl NotificationSettings {
    /// Validate the preference fields before accepting them
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.daily_count < MIN_DAILY_COUNT || self.daily_count > MAX_DAILY_COUNT {
            return Err(StoreError::Invalid {
                reason: format!(
                    "daily count {} out of range {}..={}",
                    self.daily_count, MIN_DAILY_COUNT, MAX_DAILY_COUNT
                ),
            });
        }
        if self.active_hours.start >= 24 || self.active_hours.end >= 24 {
            return Err(StoreError::Invalid {
                reason: format!(
                    "active hours {}-{} outside 0..24",
                    self.active_hours.start, self.active_hours.end
                ),
            });
        }
        if self.active_hours.start >= self.active_hours.end {
            return Err(StoreError::Invalid {
                reason: format!(
                    "active hours start {} must be before end {}",
                    self.active_hours.start, self.active_hours.end
                ),
            });
        }
        Ok(())
    }

    /// Reset today's count if the calendar date rolled over
    ///
    /// Returns true when a reset happened. Must be called before every
    /// quota check.
    pub fn reset_if_stale(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date != today {
            self.today_count = 0;
            self.last_reset_date = today;
            true
        } else {
            false
        }
    }

    /// Notifications still permitted today (saturating)
    pub fn remaining_today(&self) -> u32 {
        self.daily_count.saturating_sub(self.today_count)
    }

    /// Compare only the user-editable preference fields
    ///
    /// Quota bookkeeping (`today_count`, `last_reset_date`) is written back
    /// by the scheduler itself and must not count as a user change.
    pub fn same_preferences(&self, other: &Self) -> bool {
        self.enabled == other.enabled
            && self.daily_count == other.daily_count
            && self.active_hours == other.active_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = NotificationSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.daily_count, 10);
        assert_eq!(settings.active_hours, ActiveHours { start: 9, end: 22 });
        assert_eq!(settings.today_count, 0);
        assert_eq!(settings.remaining_today(), 10);
    }

    #[test]
    fn test_remaining_today_saturates() {
        let mut settings = NotificationSettings::default();
        settings.today_count = settings.daily_count + 5;
        assert_eq!(settings.remaining_today(), 0);
    }

    #[test]
    fn test_active_hours_contains() {
        let hours = ActiveHours { start: 9, end: 22 };
        assert!(!hours.contains(8));
        assert!(hours.contains(9));
        assert!(hours.contains(21));
        assert!(!hours.contains(22));
        assert!(!hours.contains(23));
    }

    #[test]
    fn test_validate_bounds() {
        let mut settings = NotificationSettings::default();
        assert!(settings.validate().is_ok());

        settings.daily_count = 0;
        assert!(settings.validate().is_err());
        settings.daily_count = 1001;
        assert!(settings.validate().is_err());
        settings.daily_count = 1000;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_hours() {
        let mut settings = NotificationSettings::default();

        settings.active_hours = ActiveHours { start: 22, end: 9 };
        assert!(settings.validate().is_err());

        settings.active_hours = ActiveHours { start: 9, end: 9 };
        assert!(settings.validate().is_err());

        settings.active_hours = ActiveHours { start: 0, end: 24 };
        assert!(settings.validate().is_err());

        settings.active_hours = ActiveHours { start: 0, end: 23 };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_reset_if_stale() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let mut settings = NotificationSettings {
            last_reset_date: today.pred_opt().unwrap(),
            today_count: 7,
            ..Default::default()
        };

        assert!(settings.reset_if_stale(today));
        assert_eq!(settings.today_count, 0);
        assert_eq!(settings.last_reset_date, today);

        // Same date again is a no-op
        settings.today_count = 3;
        assert!(!settings.reset_if_stale(today));
        assert_eq!(settings.today_count, 3);
    }

    #[test]
    fn test_same_preferences_ignores_bookkeeping() {
        let a = NotificationSettings::default();
        let mut b = a.clone();
        b.today_count = 9;
        b.last_reset_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(a.same_preferences(&b));

        b.daily_count = 50;
        assert!(!a.same_preferences(&b));
    }

    #[test]
    fn test_yaml_round_trip() {
        let settings = NotificationSettings {
            enabled: false,
            daily_count: 42,
            active_hours: ActiveHours { start: 8, end: 20 },
            last_reset_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            today_count: 5,
        };
        let yaml = serde_yaml::to_string(&settings).unwrap();
        let back: NotificationSettings = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(settings, back);
    }
}
