use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use moa_core::model::{Notification, NotificationStats};
use moa_core::{NotificationId, UserId};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationUpdate {
    pub is_read: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: NotificationId,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link_url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            kind: n.kind,
            title: n.title,
            message: n.message,
            link_url: n.link_url,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub total: i64,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStatsResponse {
    pub total_notifications: i64,
    pub unread_notifications: i64,
    pub read_notifications: i64,
}

impl From<NotificationStats> for NotificationStatsResponse {
    fn from(stats: NotificationStats) -> Self {
        Self {
            total_notifications: stats.total,
            unread_notifications: stats.unread,
            read_notifications: stats.read(),
        }
    }
}
