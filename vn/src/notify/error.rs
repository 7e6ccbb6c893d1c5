//! Notification error types

use thiserror::Error;

/// Errors that can occur while presenting a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification permission denied")]
    PermissionDenied,

    #[error("display failed: {0}")]
    Display(String),
}

impl NotifyError {
    /// Check if this is a permission problem rather than a display failure
    pub fn is_permission(&self) -> bool {
        matches!(self, NotifyError::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_permission() {
        assert!(NotifyError::PermissionDenied.is_permission());
        assert!(!NotifyError::Display("renderer crashed".to_string()).is_permission());
    }
}
