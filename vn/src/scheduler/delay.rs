//! Delay calculation
//!
//! Pure function of the current time, the cached settings and an injected
//! rng, so scheduling decisions are testable without arming real timers.
//! The remaining daily quota is spread across the remaining active-hours
//! window with uniform jitter: denser quotas get proportionally shorter
//! minimum spacing, and the drawn delay never exceeds the remaining window.

use std::time::Duration;

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveTime, Timelike};
use rand::Rng;
use tracing::debug;

use wordstore::NotificationSettings;

/// Compute how long to wait before the next notification attempt
pub fn calculate_delay(now: DateTime<Local>, settings: &NotificationSettings, rng: &mut impl Rng) -> Duration {
    let hour = now.hour();
    let minute = now.minute();
    let start = settings.active_hours.start;
    let end = settings.active_hours.end;

    // A rolled-over date means the count is logically zero already; the
    // authoritative reset happens on the next check-in.
    let today_count = if settings.last_reset_date != now.date_naive() {
        0
    } else {
        settings.today_count
    };

    if !settings.active_hours.contains(hour) {
        // Wait for the window to open: later today if we are before it,
        // tomorrow otherwise.
        let tomorrow = hour >= end;
        let delay = until_window_open(now, start, tomorrow);
        debug!(delay_mins = delay.as_secs() / 60, tomorrow, "outside active hours");
        return delay;
    }

    if today_count >= settings.daily_count {
        let delay = until_window_open(now, start, true);
        debug!(delay_mins = delay.as_secs() / 60, "daily quota exhausted");
        return delay;
    }

    let remaining = (settings.daily_count - today_count) as f64;
    let minutes_left = ((end - hour) * 60) as f64 - minute as f64;
    let avg = minutes_left / remaining;

    let (min_mins, max_mins) = jitter_band(settings.daily_count, avg, minutes_left);
    let mins = if max_mins <= min_mins {
        // Clipped ceiling fell below the intensity floor (tiny remaining
        // window); the ceiling wins so we never overshoot the window.
        max_mins.max(0.0)
    } else {
        rng.random_range(min_mins..max_mins)
    };

    debug!(
        delay_mins = mins as u64,
        remaining = remaining as u64,
        "drew jittered delay"
    );
    Duration::from_millis((mins * 60_000.0).round() as u64)
}

/// Jitter band bounds in minutes, selected by quota intensity
fn jitter_band(daily_count: u32, avg: f64, minutes_left: f64) -> (f64, f64) {
    if daily_count > 100 {
        ((avg * 0.3).max(1.0), (avg * 1.2).min(minutes_left * 0.8))
    } else if daily_count > 50 {
        ((avg * 0.4).max(2.0), (avg * 1.3).min(minutes_left * 0.85))
    } else {
        ((avg * 0.5).max(5.0), (avg * 1.5).min(minutes_left * 0.9))
    }
}

/// Delay from `now` until the window's start hour, today or tomorrow
fn until_window_open(now: DateTime<Local>, start_hour: u32, tomorrow: bool) -> Duration {
    let date = if tomorrow {
        now.date_naive() + chrono::Duration::days(1)
    } else {
        now.date_naive()
    };
    let target = local_at_hour(date, start_hour);
    (target - now).to_std().unwrap_or_default()
}

/// Resolve a local wall-clock hour on a date, stepping over DST gaps
fn local_at_hour(date: NaiveDate, hour: u32) -> DateTime<Local> {
    let mut naive = date
        .and_hms_opt(hour, 0, 0)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN));
    loop {
        match naive.and_local_timezone(Local) {
            LocalResult::Single(t) => return t,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => naive = naive + chrono::Duration::hours(1),
        }
    }
}
