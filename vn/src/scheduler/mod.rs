//! Notification scheduling
//!
//! [`NotificationScheduler`] owns the per-word timer chains;
//! [`calculate_delay`] is the pure delay policy underneath them.

mod core;
mod delay;

pub use self::core::{
    AUTO_DISMISS, CONDITION_RETRY, COOL_DOWN, ERROR_RETRY, MAX_INITIAL_STAGGER, NotificationScheduler,
};
pub use self::delay::calculate_delay;
