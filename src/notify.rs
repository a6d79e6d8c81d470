//! User notifications: transient success toasts and a single blocking error
//! modal.
//!
//! Time is injected (`now` arguments) so expiry is testable without sleeping.

use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(3);

/// A success notice that disappears on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

/// Holds the active toasts and the error modal.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    toasts: Vec<Toast>,
    modal: Option<String>,
    toast_duration: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl NotificationCenter {
    pub fn new(toast_duration: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            modal: None,
            toast_duration,
        }
    }

    /// Stack a success notice that expires `toast_duration` after `now`.
    pub fn push_success(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        debug!(%message, "Showing notice");
        self.toasts.push(Toast {
            message,
            expires_at: now + self.toast_duration,
        });
    }

    /// Show the error modal. A modal already on screen keeps its place and
    /// takes the new message.
    pub fn show_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, replaced = self.modal.is_some(), "Showing error modal");
        self.modal = Some(message);
    }

    pub fn dismiss_error(&mut self) {
        self.modal = None;
    }

    /// Drop toasts whose time is up. Never touches the modal.
    pub fn expire(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires_at > now);
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn modal(&self) -> Option<&str> {
        self.modal.as_deref()
    }

    pub fn has_modal(&self) -> bool {
        self.modal.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_stack_and_expire() {
        let start = Instant::now();
        let mut center = NotificationCenter::default();
        center.push_success("Copied!", start);
        center.push_success("Downloaded!", start + Duration::from_secs(1));
        assert_eq!(center.toasts().len(), 2);

        center.expire(start + Duration::from_secs(3));
        assert_eq!(center.toasts().len(), 1);
        assert_eq!(center.toasts()[0].message, "Downloaded!");

        center.expire(start + Duration::from_secs(4));
        assert!(center.toasts().is_empty());
    }

    #[test]
    fn modal_is_never_auto_dismissed() {
        let start = Instant::now();
        let mut center = NotificationCenter::default();
        center.show_error("Network down");
        center.expire(start + Duration::from_secs(3600));
        assert_eq!(center.modal(), Some("Network down"));

        center.dismiss_error();
        assert!(!center.has_modal());
    }

    #[test]
    fn new_error_replaces_the_shown_one() {
        let mut center = NotificationCenter::default();
        center.show_error("first");
        center.show_error("second");
        assert_eq!(center.modal(), Some("second"));
    }

    #[test]
    fn custom_duration() {
        let start = Instant::now();
        let mut center = NotificationCenter::new(Duration::from_millis(500));
        center.push_success("ok", start);
        center.expire(start + Duration::from_millis(499));
        assert_eq!(center.toasts().len(), 1);
        center.expire(start + Duration::from_millis(500));
        assert!(center.toasts().is_empty());
    }
}
