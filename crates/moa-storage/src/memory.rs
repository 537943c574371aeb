//! In-memory storage backend.
//!
//! Tables are plain vectors behind one `tokio::sync::RwLock`, kept in
//! insertion order. Unique keys and cascades follow the PostgreSQL schema so
//! the two backends are interchangeable in tests.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use moa_core::model::{
    Activity, ActivityStats, ActivityWithCard, Card, CardChanges, CardFilter, CardTotals,
    CompletedCard, NewActivity, NewCard, NewNotification, NewRefreshToken, NewShare, NewUser,
    Notification, NotificationStats, RefreshToken, Share, ShareChanges, ShareStats,
    SocialProvider, User, UserChanges,
};
use moa_core::{ActivityId, CardId, NotificationId, Page, RefreshTokenId, ShareId, UserId};

use crate::traits::{
    ActivityStore, CardStore, NotificationStore, RefreshTokenStore, ShareStore, UserStore,
};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    cards: Vec<Card>,
    activities: Vec<Activity>,
    shares: Vec<Share>,
    refresh_tokens: Vec<RefreshToken>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn user_mut(&mut self, id: UserId) -> Result<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::not_found("user", id))
    }

    fn card_mut(&mut self, id: CardId) -> Result<&mut Card> {
        self.cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::not_found("card", id))
    }

    fn share_mut(&mut self, id: ShareId) -> Result<&mut Share> {
        self.shares
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::not_found("share", id))
    }

    fn notification_mut(&mut self, id: NotificationId) -> Result<&mut Notification> {
        self.notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::not_found("notification", id))
    }

    /// A user's activities, newest `completed_at` first.
    ///
    /// Iterating in reverse before the stable sort puts later inserts first
    /// when two activities share a timestamp.
    fn activities_of(&self, user_id: UserId) -> Vec<&Activity> {
        let mut items: Vec<&Activity> = self
            .activities
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .collect();
        items.sort_by_key(|a| Reverse(a.completed_at));
        items
    }
}

/// Newest first by `key`, later inserts winning ties, then windowed by `page`.
fn newest_first<T: Clone, K: Ord>(
    items: impl DoubleEndedIterator<Item = T>,
    key: impl Fn(&T) -> K,
    page: Page,
) -> Vec<T> {
    let mut items: Vec<T> = items.rev().collect();
    items.sort_by_key(|item| Reverse(key(item)));
    page.slice(&items)
}

/// Storage backend that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut t = self.tables.write().await;
        let user = user.into_user(Utc::now());
        if t.users.iter().any(|u| u.login_id == user.login_id) {
            return Err(Error::duplicate("user", "login id"));
        }
        if user.social_provider.is_some()
            && t.users.iter().any(|u| {
                u.social_provider == user.social_provider && u.social_id == user.social_id
            })
        {
            return Err(Error::duplicate("user", "social account"));
        }
        t.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_login_id(&self, login_id: &str) -> Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.login_id == login_id).cloned())
    }

    async fn get_user_by_social(
        &self,
        provider: SocialProvider,
        social_id: &str,
    ) -> Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t
            .users
            .iter()
            .find(|u| u.social_provider == Some(provider) && u.social_id.as_deref() == Some(social_id))
            .cloned())
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User> {
        let mut t = self.tables.write().await;
        let user = t.user_mut(id)?;
        changes.apply(user);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<()> {
        let mut t = self.tables.write().await;
        let user = t.user_mut(id)?;
        user.password_hash = Some(password_hash.to_string());
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<()> {
        let mut t = self.tables.write().await;
        t.user_mut(id)?.last_login_at = Some(at);
        Ok(())
    }

    async fn deactivate_user(&self, id: UserId) -> Result<()> {
        let mut t = self.tables.write().await;
        let user = t.user_mut(id)?;
        user.is_active = false;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        let mut t = self.tables.write().await;
        let before = t.users.len();
        t.users.retain(|u| u.id != id);
        if t.users.len() == before {
            return Err(Error::not_found("user", id));
        }
        t.activities.retain(|a| a.user_id != id);
        t.shares.retain(|s| s.user_id != id);
        t.refresh_tokens.retain(|r| r.user_id != id);
        t.notifications.retain(|n| n.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    async fn create_card(&self, card: NewCard) -> Result<Card> {
        let mut t = self.tables.write().await;
        if t.cards.iter().any(|c| c.qr_code == card.qr_code) {
            return Err(Error::duplicate("card", "QR code"));
        }
        let card = card.into_card(Utc::now());
        t.cards.push(card.clone());
        Ok(card)
    }

    async fn get_card(&self, id: CardId) -> Result<Option<Card>> {
        let t = self.tables.read().await;
        Ok(t.cards.iter().find(|c| c.id == id).cloned())
    }

    async fn get_card_by_qr(&self, qr_code: &str) -> Result<Option<Card>> {
        let t = self.tables.read().await;
        Ok(t.cards.iter().find(|c| c.qr_code == qr_code).cloned())
    }

    async fn list_cards(&self, filter: &CardFilter, page: Page) -> Result<Vec<Card>> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.cards.iter().filter(|c| filter.matches(c)).cloned(),
            |c| c.created_at,
            page,
        ))
    }

    async fn count_cards(&self, filter: &CardFilter) -> Result<i64> {
        let t = self.tables.read().await;
        Ok(t.cards.iter().filter(|c| filter.matches(c)).count() as i64)
    }

    async fn update_card(&self, id: CardId, changes: CardChanges) -> Result<Card> {
        let mut t = self.tables.write().await;
        let card = t.card_mut(id)?;
        changes.apply(card);
        card.updated_at = Utc::now();
        Ok(card.clone())
    }

    async fn deactivate_card(&self, id: CardId) -> Result<()> {
        let mut t = self.tables.write().await;
        let card = t.card_mut(id)?;
        card.is_active = false;
        card.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_card(&self, id: CardId) -> Result<()> {
        let mut t = self.tables.write().await;
        let before = t.cards.len();
        t.cards.retain(|c| c.id != id);
        if t.cards.len() == before {
            return Err(Error::not_found("card", id));
        }
        t.activities.retain(|a| a.card_id != id);
        t.shares.retain(|s| s.card_id != id);
        Ok(())
    }

    async fn card_totals(&self, id: CardId) -> Result<CardTotals> {
        let t = self.tables.read().await;
        Ok(CardTotals {
            total_activities: t.activities.iter().filter(|a| a.card_id == id).count() as i64,
            total_shares: t.shares.iter().filter(|s| s.card_id == id).count() as i64,
        })
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn create_activity(&self, activity: NewActivity) -> Result<Activity> {
        let mut t = self.tables.write().await;
        if !t.users.iter().any(|u| u.id == activity.user_id) {
            return Err(Error::not_found("user", activity.user_id));
        }
        if !t.cards.iter().any(|c| c.id == activity.card_id) {
            return Err(Error::not_found("card", activity.card_id));
        }
        let activity = activity.into_activity(Utc::now());
        t.activities.push(activity.clone());
        Ok(activity)
    }

    async fn get_activity(&self, id: ActivityId) -> Result<Option<Activity>> {
        let t = self.tables.read().await;
        Ok(t.activities.iter().find(|a| a.id == id).cloned())
    }

    async fn list_user_activities(&self, user_id: UserId, page: Page) -> Result<Vec<Activity>> {
        let t = self.tables.read().await;
        let items: Vec<Activity> = t.activities_of(user_id).into_iter().cloned().collect();
        Ok(page.slice(&items))
    }

    async fn list_user_card_activities(
        &self,
        user_id: UserId,
        card_id: CardId,
        page: Page,
    ) -> Result<Vec<Activity>> {
        let t = self.tables.read().await;
        let items: Vec<Activity> = t
            .activities_of(user_id)
            .into_iter()
            .filter(|a| a.card_id == card_id)
            .cloned()
            .collect();
        Ok(page.slice(&items))
    }

    async fn count_user_activities(
        &self,
        user_id: UserId,
        card_id: Option<CardId>,
    ) -> Result<i64> {
        let t = self.tables.read().await;
        Ok(t
            .activities
            .iter()
            .filter(|a| a.user_id == user_id && card_id.is_none_or(|c| a.card_id == c))
            .count() as i64)
    }

    async fn completed_cards(
        &self,
        user_id: UserId,
        activity_type: Option<&str>,
        page: Page,
    ) -> Result<Vec<CompletedCard>> {
        let t = self.tables.read().await;
        let mut grouped: HashMap<CardId, (DateTime<Utc>, i64)> = HashMap::new();
        for a in t.activities.iter().filter(|a| a.user_id == user_id) {
            let entry = grouped.entry(a.card_id).or_insert((a.completed_at, 0));
            entry.0 = entry.0.max(a.completed_at);
            entry.1 += 1;
        }
        let mut cards: Vec<CompletedCard> = t
            .cards
            .iter()
            .filter(|c| activity_type.is_none_or(|kind| c.activity_type == kind))
            .filter_map(|c| {
                grouped.get(&c.id).map(|(last, count)| CompletedCard {
                    card_id: c.id,
                    title: c.title.clone(),
                    thumbnail_url: c.thumbnail_url.clone(),
                    activity_type: c.activity_type.clone(),
                    last_activity_date: *last,
                    activity_count: *count,
                })
            })
            .collect();
        cards.sort_by_key(|c| Reverse(c.last_activity_date));
        Ok(page.slice(&cards))
    }

    async fn recent_activities(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ActivityWithCard>> {
        let t = self.tables.read().await;
        Ok(t
            .activities_of(user_id)
            .into_iter()
            .filter(|a| a.completed_at >= since)
            .filter_map(|a| {
                t.cards.iter().find(|c| c.id == a.card_id).map(|c| ActivityWithCard {
                    activity: a.clone(),
                    card_title: c.title.clone(),
                    card_thumbnail_url: c.thumbnail_url.clone(),
                    activity_type: c.activity_type.clone(),
                })
            })
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn activity_stats(&self, user_id: UserId) -> Result<ActivityStats> {
        let t = self.tables.read().await;
        let mine: Vec<&Activity> = t.activities.iter().filter(|a| a.user_id == user_id).collect();
        let unique: HashSet<CardId> = mine.iter().map(|a| a.card_id).collect();
        Ok(ActivityStats {
            total_activities: mine.len() as i64,
            unique_cards: unique.len() as i64,
            recent_activity_date: mine.iter().map(|a| a.completed_at).max(),
        })
    }
}

#[async_trait]
impl ShareStore for MemoryStore {
    async fn create_share(&self, share: NewShare) -> Result<Share> {
        let mut t = self.tables.write().await;
        if t.shares.iter().any(|s| s.share_token == share.share_token) {
            return Err(Error::duplicate("share", "token"));
        }
        if !t.cards.iter().any(|c| c.id == share.card_id) {
            return Err(Error::not_found("card", share.card_id));
        }
        let share = share.into_share(Utc::now());
        t.shares.push(share.clone());
        Ok(share)
    }

    async fn get_share(&self, id: ShareId) -> Result<Option<Share>> {
        let t = self.tables.read().await;
        Ok(t.shares.iter().find(|s| s.id == id).cloned())
    }

    async fn get_share_by_token(&self, token: &str) -> Result<Option<Share>> {
        let t = self.tables.read().await;
        Ok(t.shares.iter().find(|s| s.share_token == token).cloned())
    }

    async fn list_user_shares(
        &self,
        user_id: UserId,
        is_active: Option<bool>,
        page: Page,
    ) -> Result<Vec<Share>> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.shares
                .iter()
                .filter(|s| s.user_id == user_id && is_active.is_none_or(|a| s.is_active == a))
                .cloned(),
            |s| s.created_at,
            page,
        ))
    }

    async fn count_user_shares(&self, user_id: UserId, is_active: Option<bool>) -> Result<i64> {
        let t = self.tables.read().await;
        Ok(t
            .shares
            .iter()
            .filter(|s| s.user_id == user_id && is_active.is_none_or(|a| s.is_active == a))
            .count() as i64)
    }

    async fn list_card_shares(&self, card_id: CardId) -> Result<Vec<Share>> {
        let t = self.tables.read().await;
        let mut shares: Vec<Share> = t
            .shares
            .iter()
            .rev()
            .filter(|s| s.card_id == card_id)
            .cloned()
            .collect();
        shares.sort_by_key(|s| Reverse(s.created_at));
        Ok(shares)
    }

    async fn update_share(&self, id: ShareId, changes: ShareChanges) -> Result<Share> {
        let mut t = self.tables.write().await;
        let share = t.share_mut(id)?;
        changes.apply(share);
        share.updated_at = Utc::now();
        Ok(share.clone())
    }

    async fn increment_share_views(&self, id: ShareId) -> Result<Share> {
        let mut t = self.tables.write().await;
        let share = t.share_mut(id)?;
        share.view_count += 1;
        Ok(share.clone())
    }

    async fn deactivate_share(&self, id: ShareId) -> Result<()> {
        let mut t = self.tables.write().await;
        let share = t.share_mut(id)?;
        share.is_active = false;
        share.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_share(&self, id: ShareId) -> Result<()> {
        let mut t = self.tables.write().await;
        let before = t.shares.len();
        t.shares.retain(|s| s.id != id);
        if t.shares.len() == before {
            return Err(Error::not_found("share", id));
        }
        Ok(())
    }

    async fn share_stats(&self, user_id: UserId) -> Result<ShareStats> {
        let t = self.tables.read().await;
        let mine: Vec<&Share> = t.shares.iter().filter(|s| s.user_id == user_id).collect();
        let most_viewed = mine
            .iter()
            .filter(|s| s.view_count > 0)
            .max_by_key(|s| s.view_count)
            .map(|s| s.id);
        Ok(ShareStats {
            total_shares: mine.len() as i64,
            active_shares: mine.iter().filter(|s| s.is_active).count() as i64,
            total_views: mine.iter().map(|s| s.view_count).sum(),
            most_viewed_share_id: most_viewed,
        })
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn create_refresh_token(&self, token: NewRefreshToken) -> Result<RefreshToken> {
        let mut t = self.tables.write().await;
        if t.refresh_tokens.iter().any(|r| r.token_hash == token.token_hash) {
            return Err(Error::duplicate("refresh token", "token"));
        }
        let token = token.into_token(Utc::now());
        t.refresh_tokens.push(token.clone());
        Ok(token)
    }

    async fn get_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>> {
        let t = self.tables.read().await;
        Ok(t
            .refresh_tokens
            .iter()
            .find(|r| r.token_hash == token_hash)
            .cloned())
    }

    async fn revoke_refresh_token(&self, id: RefreshTokenId) -> Result<bool> {
        let mut t = self.tables.write().await;
        let token = t
            .refresh_tokens
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::not_found("refresh token", id))?;
        if token.is_revoked {
            return Ok(false);
        }
        let now = Utc::now();
        token.is_revoked = true;
        token.revoked_at = Some(now);
        token.updated_at = now;
        Ok(true)
    }

    async fn revoke_user_refresh_tokens(&self, user_id: UserId) -> Result<u64> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let mut revoked = 0;
        for token in t
            .refresh_tokens
            .iter_mut()
            .filter(|r| r.user_id == user_id && !r.is_revoked)
        {
            token.is_revoked = true;
            token.revoked_at = Some(now);
            token.updated_at = now;
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn delete_expired_refresh_tokens(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut t = self.tables.write().await;
        let before = t.refresh_tokens.len();
        t.refresh_tokens.retain(|r| !r.is_expired_at(now));
        Ok((before - t.refresh_tokens.len()) as u64)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification> {
        let mut t = self.tables.write().await;
        if !t.users.iter().any(|u| u.id == notification.user_id) {
            return Err(Error::not_found("user", notification.user_id));
        }
        let notification = notification.into_notification(Utc::now());
        t.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn get_notification(&self, id: NotificationId) -> Result<Option<Notification>> {
        let t = self.tables.read().await;
        Ok(t.notifications.iter().find(|n| n.id == id).cloned())
    }

    async fn list_user_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
        page: Page,
    ) -> Result<Vec<Notification>> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.notifications
                .iter()
                .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
                .cloned(),
            |n| n.created_at,
            page,
        ))
    }

    async fn notification_stats(&self, user_id: UserId) -> Result<NotificationStats> {
        let t = self.tables.read().await;
        let mine = t.notifications.iter().filter(|n| n.user_id == user_id);
        let (total, unread) = mine.fold((0, 0), |(total, unread), n| {
            (total + 1, unread + i64::from(!n.is_read))
        });
        Ok(NotificationStats { total, unread })
    }

    async fn set_notification_read(
        &self,
        id: NotificationId,
        is_read: bool,
    ) -> Result<Notification> {
        let mut t = self.tables.write().await;
        let notification = t.notification_mut(id)?;
        notification.is_read = is_read;
        notification.updated_at = Utc::now();
        Ok(notification.clone())
    }

    async fn mark_all_notifications_read(&self, user_id: UserId) -> Result<u64> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let mut updated = 0;
        for n in t
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            n.updated_at = now;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_notification(&self, id: NotificationId) -> Result<()> {
        let mut t = self.tables.write().await;
        let before = t.notifications.len();
        t.notifications.retain(|n| n.id != id);
        if t.notifications.len() == before {
            return Err(Error::not_found("notification", id));
        }
        Ok(())
    }
}
