use chrono::{DateTime, Utc};

use crate::{NotificationId, UserId};

/// A message delivered to one user (share received, card reminder, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    /// Short machine-readable kind, e.g. `share_received`.
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link_url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to deliver a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link_url: Option<String>,
}

impl NewNotification {
    /// Materialise the record as unread.
    pub fn into_notification(self, now: DateTime<Utc>) -> Notification {
        Notification {
            id: NotificationId::new(),
            user_id: self.user_id,
            kind: self.kind,
            title: self.title,
            message: self.message,
            link_url: self.link_url,
            is_read: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-user notification counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationStats {
    pub total: i64,
    pub unread: i64,
}

impl NotificationStats {
    /// Notifications already read.
    pub fn read(&self) -> i64 {
        self.total - self.unread
    }
}
