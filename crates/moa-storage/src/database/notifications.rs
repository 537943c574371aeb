use async_trait::async_trait;
use chrono::Utc;

use moa_core::model::{NewNotification, Notification, NotificationStats};
use moa_core::{NotificationId, Page, UserId};

use super::rows::NotificationRow;
use super::{PgStore, expect_affected, map_write_error};
use crate::traits::NotificationStore;
use crate::{Error, Result};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, kind, title, message, link_url, is_read, created_at, updated_at";

#[async_trait]
impl NotificationStore for PgStore {
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification> {
        let notification = notification.into_notification(Utc::now());
        sqlx::query(&format!(
            "INSERT INTO notifications ({NOTIFICATION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(notification.id.into_uuid())
        .bind(notification.user_id.into_uuid())
        .bind(&notification.kind)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.link_url)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .bind(notification.updated_at)
        .execute(self.pool())
        .await
        .map_err(map_write_error)?;
        Ok(notification)
    }

    async fn get_notification(&self, id: NotificationId) -> Result<Option<Notification>> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(id.into_uuid())
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Notification::from))
    }

    async fn list_user_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
        page: Page,
    ) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = $1 AND (NOT $2::boolean OR NOT is_read) \
             ORDER BY created_at DESC, id DESC OFFSET $3 LIMIT $4"
        ))
        .bind(user_id.into_uuid())
        .bind(unread_only)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn notification_stats(&self, user_id: UserId) -> Result<NotificationStats> {
        let (total, unread): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE NOT is_read) \
             FROM notifications WHERE user_id = $1",
        )
        .bind(user_id.into_uuid())
        .fetch_one(self.pool())
        .await?;
        Ok(NotificationStats { total, unread })
    }

    async fn set_notification_read(
        &self,
        id: NotificationId,
        is_read: bool,
    ) -> Result<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "UPDATE notifications SET is_read = $2, updated_at = $3 \
             WHERE id = $1 RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id.into_uuid())
        .bind(is_read)
        .bind(Utc::now())
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| Error::not_found("notification", id))?;
        Ok(row.into())
    }

    async fn mark_all_notifications_read(&self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, updated_at = $2 \
             WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id.into_uuid())
        .bind(Utc::now())
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_notification(&self, id: NotificationId) -> Result<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id.into_uuid())
            .execute(self.pool())
            .await?;
        expect_affected(result.rows_affected(), "notification", id)
    }
}
