use std::sync::Mutex;

// 1. Notifier Contract
/// Notifier
///
/// Outbound boundary to the host's toast/notification area. The authorization gate
/// is the only producer today; it emits a warning whenever it redirects.
pub trait Notifier: Send + Sync {
    fn warning(&self, title: &str, message: &str);
}

// 2. The Log-Backed Implementation
/// TracingNotifier
///
/// Routes notifications into the structured log. Used by the binary and by hosts that
/// have no visual notification area.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warning(&self, title: &str, message: &str) {
        tracing::warn!(title, message, "notification");
    }
}

// 3. The Recording Implementation (For Tests)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

/// RecordingNotifier
///
/// Keeps every notification it receives so tests can assert on count and content.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|received| received.clone())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.received.lock().map(|received| received.len()).unwrap_or(0)
    }
}

impl Notifier for RecordingNotifier {
    fn warning(&self, title: &str, message: &str) {
        if let Ok(mut received) = self.received.lock() {
            received.push(Notification {
                level: NotificationLevel::Warning,
                title: title.to_string(),
                message: message.to_string(),
            });
        }
    }
}
