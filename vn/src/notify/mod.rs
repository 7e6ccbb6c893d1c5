//! Platform notification capability
//!
//! The scheduler talks to the host notification system through the
//! [`Notifier`] trait: a tri-state permission gate plus a `present` call
//! that yields whether the notification was actually displayed. How
//! permission is obtained from the platform is the implementation's
//! concern.

mod console;
mod error;
mod notifier;

pub use console::ConsoleNotifier;
pub use error::NotifyError;
pub use notifier::{NotificationRequest, Notifier, Permission, Presentation};

#[cfg(test)]
pub use notifier::mock;
