//! Injectable wall-clock access
//!
//! The scheduler never reads the system clock directly; it goes through
//! this seam so quota resets and delay computation are testable without
//! waiting on real time.

use chrono::{DateTime, Local, NaiveDate};

/// Wall-clock capability
pub trait Clock: Send + Sync {
    /// Current local time
    fn now(&self) -> DateTime<Local>;

    /// Current local calendar date
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The real system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Manually-driven clock for unit tests
    pub struct ManualClock {
        now: Mutex<DateTime<Local>>,
    }

    impl ManualClock {
        pub fn at(now: DateTime<Local>) -> Self {
            Self { now: Mutex::new(now) }
        }

        pub fn set(&self, now: DateTime<Local>) {
            *self.now.lock().unwrap() = now;
        }

        pub fn advance(&self, delta: chrono::Duration) {
            let mut guard = self.now.lock().unwrap();
            *guard += delta;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Local> {
            *self.now.lock().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::ManualClock;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_clock_today_matches_now() {
        let clock = SystemClock;
        assert_eq!(clock.today(), clock.now().date_naive());
    }

    #[test]
    fn test_manual_clock() {
        let start = Local.with_ymd_and_hms(2025, 6, 2, 10, 30, 0).unwrap();
        let clock = ManualClock::at(start);
        assert_eq!(clock.now(), start);

        clock.advance(chrono::Duration::hours(14));
        assert_eq!(clock.today(), start.date_naive().succ_opt().unwrap());
    }
}
