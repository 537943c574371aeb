use std::sync::Arc;

use moa_core::model::{NewNotification, Notification, NotificationStats};
use moa_core::{NotificationId, Page, UserId, Validate};
use moa_storage::{NotificationStore, Store};

use super::ensure_owner;
use crate::error::{ApiError, Result};

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn Store>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Deliver a notification to a user.
    pub async fn notify(&self, notification: NewNotification) -> Result<Notification> {
        notification.validate()?;
        let notification = self.store.create_notification(notification).await?;
        tracing::info!(
            user_id = %notification.user_id,
            kind = %notification.kind,
            "Created notification"
        );
        Ok(notification)
    }

    pub async fn list_mine(
        &self,
        user_id: UserId,
        unread_only: bool,
        page: Page,
    ) -> Result<(Vec<Notification>, NotificationStats)> {
        let items = self
            .store
            .list_user_notifications(user_id, unread_only, page)
            .await?;
        let stats = self.store.notification_stats(user_id).await?;
        Ok((items, stats))
    }

    pub async fn stats(&self, user_id: UserId) -> Result<NotificationStats> {
        Ok(self.store.notification_stats(user_id).await?)
    }

    pub async fn set_read(
        &self,
        user_id: UserId,
        id: NotificationId,
        is_read: bool,
    ) -> Result<Notification> {
        self.get_owned(user_id, id).await?;
        Ok(self.store.set_notification_read(id, is_read).await?)
    }

    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64> {
        Ok(self.store.mark_all_notifications_read(user_id).await?)
    }

    pub async fn delete(&self, user_id: UserId, id: NotificationId) -> Result<()> {
        self.get_owned(user_id, id).await?;
        self.store.delete_notification(id).await?;
        Ok(())
    }

    async fn get_owned(&self, user_id: UserId, id: NotificationId) -> Result<Notification> {
        let notification = self
            .store
            .get_notification(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Notification not found"))?;
        ensure_owner(notification.user_id, user_id, "notification")?;
        Ok(notification)
    }
}
