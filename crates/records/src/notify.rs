//! Toast-style notices backed by a `tokio::sync::broadcast` channel.
//!
//! Operations that the user triggered (saving a form, deleting a row,
//! loading a dashboard chart) publish their outcome here. Whatever renders
//! the UI subscribes and shows them; nothing else depends on delivery.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;

use counsel_core::types::Timestamp;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// One user-facing message.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub timestamp: Timestamp,
}

/// Fan-out channel for [`Notice`]s.
pub struct Notifier {
    sender: broadcast::Sender<Notice>,
}

impl Notifier {
    /// Create a notifier with a specific channel capacity.
    ///
    /// Slow subscribers lose the oldest notices and observe
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped silently when nobody
    /// is listening.
    pub fn publish(&self, level: NoticeLevel, message: impl Into<String>) {
        let _ = self.sender.send(Notice {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Error, message);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_notices() {
        let notifier = Notifier::default();
        let mut rx = notifier.subscribe();

        notifier.success("Record saved");
        notifier.error("Could not reach the server");

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.level, NoticeLevel::Success);
        assert_eq!(first.message, "Record saved");
        assert_eq!(second.level, NoticeLevel::Error);
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        Notifier::new(4).info("nobody is listening");
    }
}
