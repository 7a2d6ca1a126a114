//! Notification Center
//!
//! User-facing notices produced at the boundary when an operation succeeds,
//! degrades or fails. The UI drains the queue and renders toasts; nothing
//! here ever panics the hosting process.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

/// Upper bound on undrained notices; oldest are dropped beyond it
const MAX_PENDING: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

static QUEUE: Lazy<Mutex<Vec<Notification>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Queue a notice for the UI.
pub fn notify(kind: NotificationKind, message: impl Into<String>) {
    let notification = Notification {
        id: Uuid::new_v4().to_string(),
        kind,
        message: message.into(),
        timestamp: Utc::now(),
    };

    let mut queue = QUEUE.lock();
    queue.push(notification);
    if queue.len() > MAX_PENDING {
        queue.remove(0);
    }
}

pub fn notify_success(message: impl Into<String>) {
    notify(NotificationKind::Success, message);
}

pub fn notify_error(message: impl Into<String>) {
    let message = message.into();
    log::warn!("{}", message);
    notify(NotificationKind::Error, message);
}

pub fn notify_info(message: impl Into<String>) {
    notify(NotificationKind::Info, message);
}

/// Hand all pending notices to the UI, clearing the queue.
pub fn drain() -> Vec<Notification> {
    std::mem::take(&mut *QUEUE.lock())
}

pub fn pending_count() -> usize {
    QUEUE.lock().len()
}

// ============================================================================
// TESTS
// ============================================================================
