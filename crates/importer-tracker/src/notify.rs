//! Auto-dismissing status notifications.
//!
//! Every tracker operation reports its outcome here. Notifications are kept
//! in a bounded history, are visible until their dismiss deadline passes, are
//! broadcast to subscribers as they are emitted, and are mirrored to tracing.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{info, warn};

/// Capacity of the subscriber channel.
const CHANNEL_CAPACITY: usize = 64;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    /// Icon for terminal output.
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ",
            Severity::Success => "✓",
            Severity::Error => "✗",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emitted notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Monotonic id, unique per notifier
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    pub created_at: DateTime<Utc>,
    /// When the notification stops being visible
    pub expires_at: Instant,
}

impl Notification {
    /// Returns true while the notification should still be shown.
    pub fn is_visible_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    /// Single-line form used by the CLI.
    pub fn format_compact(&self) -> String {
        format!("{} {}", self.severity.icon(), self.message)
    }
}

#[derive(Debug, Default)]
struct NotifierState {
    next_id: u64,
    history: VecDeque<Notification>,
    dismissed_before: u64,
}

/// Notification emitter shared by all tracker components.
#[derive(Debug)]
pub struct Notifier {
    state: Mutex<NotifierState>,
    dismiss_after: Duration,
    history_limit: usize,
    sender: broadcast::Sender<Notification>,
}

impl Notifier {
    /// Create a notifier with the given auto-dismiss delay and history cap.
    pub fn new(dismiss_after: Duration, history_limit: usize) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(NotifierState::default()),
            dismiss_after,
            history_limit: history_limit.max(1),
            sender,
        }
    }

    /// Emit a notification.
    pub fn emit(&self, severity: Severity, message: impl Into<String>) -> Notification {
        let message = message.into();
        match severity {
            Severity::Error => warn!(target: "importer::notify", severity = %severity, "{}", message),
            _ => info!(target: "importer::notify", severity = %severity, "{}", message),
        }

        let notification = {
            let mut state = self.lock();
            state.next_id += 1;
            let notification = Notification {
                id: state.next_id,
                severity,
                message,
                created_at: Utc::now(),
                expires_at: Instant::now() + self.dismiss_after,
            };
            state.history.push_back(notification.clone());
            while state.history.len() > self.history_limit {
                state.history.pop_front();
            }
            notification
        };

        // No subscribers is fine.
        let _ = self.sender.send(notification.clone());
        notification
    }

    pub fn info(&self, message: impl Into<String>) -> Notification {
        self.emit(Severity::Info, message)
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.emit(Severity::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.emit(Severity::Error, message)
    }

    /// Receive notifications as they are emitted.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// All retained notifications, oldest first.
    pub fn history(&self) -> Vec<Notification> {
        self.lock().history.iter().cloned().collect()
    }

    /// Notifications that are not expired or dismissed.
    pub fn visible(&self) -> Vec<Notification> {
        let now = Instant::now();
        let state = self.lock();
        state
            .history
            .iter()
            .filter(|n| n.id > state.dismissed_before && n.is_visible_at(now))
            .cloned()
            .collect()
    }

    /// Most recent notification.
    pub fn latest(&self) -> Option<Notification> {
        self.lock().history.back().cloned()
    }

    /// Hide everything emitted so far.
    pub fn dismiss_all(&self) {
        let mut state = self.lock();
        state.dismissed_before = state.next_id;
    }

    /// Number of notifications ever emitted.
    pub fn emitted_count(&self) -> u64 {
        self.lock().next_id
    }

    fn lock(&self) -> MutexGuard<'_, NotifierState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Duration::from_millis(5000), 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_notifications_auto_dismiss() {
        let notifier = Notifier::new(Duration::from_secs(5), 10);
        notifier.success("File uploaded successfully! Processing...");
        assert_eq!(notifier.visible().len(), 1);

        tokio::time::advance(Duration::from_millis(4999)).await;
        assert_eq!(notifier.visible().len(), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(notifier.visible().is_empty());
        assert_eq!(notifier.history().len(), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let notifier = Notifier::new(Duration::from_secs(5), 3);
        for i in 0..5 {
            notifier.info(format!("message {i}"));
        }
        let history = notifier.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].message, "message 2");
        assert_eq!(notifier.emitted_count(), 5);
    }

    #[tokio::test]
    async fn test_subscribers_receive_emissions() {
        let notifier = Notifier::default();
        let mut rx = notifier.subscribe();
        notifier.error("Failed to load webhooks");

        let received = rx.recv().await.unwrap();
        assert_eq!(received.severity, Severity::Error);
        assert_eq!(received.format_compact(), "✗ Failed to load webhooks");
    }

    #[tokio::test]
    async fn test_dismiss_all() {
        let notifier = Notifier::default();
        notifier.info("one");
        notifier.dismiss_all();
        assert!(notifier.visible().is_empty());
        notifier.info("two");
        assert_eq!(notifier.visible().len(), 1);
    }
}
