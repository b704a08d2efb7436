//! User-visible notices (toasts) raised by the session layer.

use tokio::sync::broadcast;
use tracing::{info, warn};

/// Shown whenever a session is terminated without the user asking.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Toast/alert sink. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Headless notifier: notices go to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info => info!(message, "notice"),
            NoticeLevel::Error => warn!(message, "notice"),
        }
    }
}

/// Fans notices out to any number of UI subscribers.
#[derive(Clone, Debug)]
pub struct ChannelNotifier {
    tx: broadcast::Sender<Notice>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<Notice>) {
        let (tx, rx) = broadcast::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        // No subscribers is fine; the notice is simply dropped.
        let _ = self.tx.send(Notice { level, message: message.to_owned() });
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
