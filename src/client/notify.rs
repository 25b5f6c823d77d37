use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationLevel::Success => write!(f, "SUCCESS"),
            NotificationLevel::Error => write!(f, "ERROR"),
            NotificationLevel::Info => write!(f, "INFO"),
        }
    }
}

/// User-facing message emitted by the session manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Lets a renderer dismiss one specific message
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Surface that renders notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Bounded in-memory notification queue.
///
/// Clones share the same queue. Once `max_entries` is reached the oldest
/// notification is dropped.
#[derive(Debug, Clone)]
pub struct NotificationLog {
    entries: Arc<Mutex<VecDeque<Notification>>>,
    max_entries: usize,
}

impl NotificationLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            max_entries: max_entries.max(1),
        }
    }

    pub fn entries(&self) -> Vec<Notification> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.iter().cloned().collect()
    }

    /// Remove and return everything queued so far
    pub fn drain(&self) -> Vec<Notification> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.drain(..).collect()
    }

    /// Remove one notification by id
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|n| n.id != id);
        entries.len() != before
    }

    pub fn last(&self) -> Option<Notification> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.back().cloned()
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.push_back(notification);
        while entries.len() > self.max_entries {
            entries.pop_front();
        }
    }
}

/// Writes notifications to the tracing output
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => tracing::warn!(target: "edusync::notify", "{}", notification.message),
            _ => tracing::info!(target: "edusync::notify", "{}", notification.message),
        }
    }
}
