//! Terminal notifier
//!
//! Renders reminders to stdout for foreground `vn run` sessions. A
//! terminal the user launched is treated as consent, so permission is
//! always granted. Auto-dismiss has no meaning for a scrollback line and
//! is ignored.

use async_trait::async_trait;
use colored::Colorize;

use super::{NotificationRequest, Notifier, NotifyError, Permission, Presentation};

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn present(&self, request: NotificationRequest) -> Result<Presentation, NotifyError> {
        println!("{} {}", request.title.bold().yellow(), request.body);
        Ok(Presentation::Displayed)
    }
}
