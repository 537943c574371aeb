//! Storage abstraction traits.
//!
//! Lookups return `Ok(None)` for a missing record; updates and deletes return
//! [`Error::NotFound`](crate::Error::NotFound). Listings take a [`Page`] and
//! return newest records first unless noted otherwise.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use moa_core::model::{
    Activity, ActivityStats, ActivityWithCard, Card, CardChanges, CardFilter, CardTotals,
    CompletedCard, NewActivity, NewCard, NewNotification, NewRefreshToken, NewShare, NewUser,
    Notification, NotificationStats, RefreshToken, Share, ShareChanges, ShareStats,
    SocialProvider, User, UserChanges,
};
use moa_core::{ActivityId, CardId, NotificationId, Page, RefreshTokenId, ShareId, UserId};

use crate::Result;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. A taken login id or social identity is a `Duplicate`.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Look up by login id, which is stored lowercase.
    async fn get_user_by_login_id(&self, login_id: &str) -> Result<Option<User>>;

    async fn get_user_by_social(
        &self,
        provider: SocialProvider,
        social_id: &str,
    ) -> Result<Option<User>>;

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User>;

    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<()>;

    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<()>;

    async fn deactivate_user(&self, id: UserId) -> Result<()>;

    /// Hard delete; cascades to everything the user owns.
    async fn delete_user(&self, id: UserId) -> Result<()>;
}

#[async_trait]
pub trait CardStore: Send + Sync {
    /// Insert a card. A taken QR code is a `Duplicate`.
    async fn create_card(&self, card: NewCard) -> Result<Card>;

    async fn get_card(&self, id: CardId) -> Result<Option<Card>>;

    async fn get_card_by_qr(&self, qr_code: &str) -> Result<Option<Card>>;

    async fn list_cards(&self, filter: &CardFilter, page: Page) -> Result<Vec<Card>>;

    async fn count_cards(&self, filter: &CardFilter) -> Result<i64>;

    async fn update_card(&self, id: CardId, changes: CardChanges) -> Result<Card>;

    async fn deactivate_card(&self, id: CardId) -> Result<()>;

    /// Hard delete; cascades to activities and shares of the card.
    async fn delete_card(&self, id: CardId) -> Result<()>;

    /// How many activities and shares reference the card.
    async fn card_totals(&self, id: CardId) -> Result<CardTotals>;
}

#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn create_activity(&self, activity: NewActivity) -> Result<Activity>;

    async fn get_activity(&self, id: ActivityId) -> Result<Option<Activity>>;

    /// Newest `completed_at` first.
    async fn list_user_activities(&self, user_id: UserId, page: Page) -> Result<Vec<Activity>>;

    /// One user's activities on one card, newest `completed_at` first.
    async fn list_user_card_activities(
        &self,
        user_id: UserId,
        card_id: CardId,
        page: Page,
    ) -> Result<Vec<Activity>>;

    async fn count_user_activities(&self, user_id: UserId, card_id: Option<CardId>)
    -> Result<i64>;

    /// Distinct cards the user worked on, most recently active first.
    async fn completed_cards(
        &self,
        user_id: UserId,
        activity_type: Option<&str>,
        page: Page,
    ) -> Result<Vec<CompletedCard>>;

    /// Activities completed at or after `since`, newest first, joined with their card.
    async fn recent_activities(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ActivityWithCard>>;

    async fn activity_stats(&self, user_id: UserId) -> Result<ActivityStats>;
}

#[async_trait]
pub trait ShareStore: Send + Sync {
    /// Insert a share. A taken token is a `Duplicate`.
    async fn create_share(&self, share: NewShare) -> Result<Share>;

    async fn get_share(&self, id: ShareId) -> Result<Option<Share>>;

    async fn get_share_by_token(&self, token: &str) -> Result<Option<Share>>;

    async fn list_user_shares(
        &self,
        user_id: UserId,
        is_active: Option<bool>,
        page: Page,
    ) -> Result<Vec<Share>>;

    async fn count_user_shares(&self, user_id: UserId, is_active: Option<bool>) -> Result<i64>;

    async fn list_card_shares(&self, card_id: CardId) -> Result<Vec<Share>>;

    async fn update_share(&self, id: ShareId, changes: ShareChanges) -> Result<Share>;

    /// Atomically add one view and return the updated share.
    async fn increment_share_views(&self, id: ShareId) -> Result<Share>;

    async fn deactivate_share(&self, id: ShareId) -> Result<()>;

    async fn delete_share(&self, id: ShareId) -> Result<()>;

    async fn share_stats(&self, user_id: UserId) -> Result<ShareStats>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create_refresh_token(&self, token: NewRefreshToken) -> Result<RefreshToken>;

    async fn get_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>>;

    /// Revoke one token. Returns `false` when it was already revoked, so only
    /// one of several concurrent callers wins.
    async fn revoke_refresh_token(&self, id: RefreshTokenId) -> Result<bool>;

    /// Revoke every live token of a user, returning how many were newly revoked.
    async fn revoke_user_refresh_tokens(&self, user_id: UserId) -> Result<u64>;

    /// Drop tokens that expired before `now`, returning how many were removed.
    async fn delete_expired_refresh_tokens(&self, now: DateTime<Utc>) -> Result<u64>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification>;

    async fn get_notification(&self, id: NotificationId) -> Result<Option<Notification>>;

    async fn list_user_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
        page: Page,
    ) -> Result<Vec<Notification>>;

    async fn notification_stats(&self, user_id: UserId) -> Result<NotificationStats>;

    async fn set_notification_read(&self, id: NotificationId, is_read: bool)
    -> Result<Notification>;

    /// Mark every unread notification read, returning how many changed.
    async fn mark_all_notifications_read(&self, user_id: UserId) -> Result<u64>;

    async fn delete_notification(&self, id: NotificationId) -> Result<()>;
}

/// Everything the API needs from a backend.
pub trait Store:
    UserStore + CardStore + ActivityStore + ShareStore + RefreshTokenStore + NotificationStore
{
}

impl<T> Store for T where
    T: UserStore + CardStore + ActivityStore + ShareStore + RefreshTokenStore + NotificationStore
{
}
