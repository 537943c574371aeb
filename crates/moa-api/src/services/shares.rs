//! Share links: creation, owner management, and public access by token.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use moa_auth::PasswordHasher;
use moa_auth::tokens::share_token;
use moa_core::config::ShareConfig;
use moa_core::model::{Card, NewShare, Share, ShareChanges, ShareStats};
use moa_core::validation::{validate_expiry_days, validate_share_password};
use moa_core::{Page, Paginated, ShareId, UserId};
use moa_storage::{CardStore, ShareStore, Store};

use super::ensure_owner;
use crate::dto::{ShareCreate, ShareUpdate};
use crate::error::{ApiError, Result};

/// Attempts at drawing an unused share token.
const TOKEN_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct ShareService {
    store: Arc<dyn Store>,
    passwords: PasswordHasher,
    config: ShareConfig,
}

impl ShareService {
    pub fn new(store: Arc<dyn Store>, passwords: PasswordHasher, config: ShareConfig) -> Self {
        Self {
            store,
            passwords,
            config,
        }
    }

    /// Public URL of a share token.
    pub fn share_url(&self, token: &str) -> String {
        self.config.share_url(token)
    }

    pub async fn create(&self, user_id: UserId, req: ShareCreate) -> Result<Share> {
        let card = self
            .store
            .get_card(req.card_id)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| ApiError::not_found("Card not found"))?;

        let expiry_days = req
            .expiry_days
            .unwrap_or(Some(self.config.default_expiry_days));
        let now = Utc::now();
        let expiry_date = expiry_from_days(expiry_days, now)?;
        let password_hash = self.hash_share_password(req.password.as_deref()).await?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let new_share = NewShare {
                user_id,
                card_id: card.id,
                share_token: share_token(self.config.token_length),
                password_hash: password_hash.clone(),
                expiry_date,
            };
            match self.store.create_share(new_share).await {
                Ok(share) => {
                    tracing::info!(share_id = %share.id, card_id = %card.id, "Created share");
                    return Ok(share);
                }
                Err(moa_storage::Error::Duplicate { .. }) if attempt < TOKEN_ATTEMPTS => {
                    tracing::warn!(attempt, "Share token collision, drawing a new one");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub async fn list_mine(
        &self,
        user_id: UserId,
        is_active: Option<bool>,
        page: Page,
    ) -> Result<Paginated<Share>> {
        let items = self.store.list_user_shares(user_id, is_active, page).await?;
        let total = self.store.count_user_shares(user_id, is_active).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn stats(&self, user_id: UserId) -> Result<ShareStats> {
        Ok(self.store.share_stats(user_id).await?)
    }

    pub async fn get_owned(&self, user_id: UserId, id: ShareId) -> Result<Share> {
        let share = self
            .store
            .get_share(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Share not found"))?;
        ensure_owner(share.user_id, user_id, "share")?;
        Ok(share)
    }

    pub async fn update(&self, user_id: UserId, id: ShareId, req: ShareUpdate) -> Result<Share> {
        let share = self.get_owned(user_id, id).await?;
        let changes = ShareChanges {
            password_hash: self.hash_share_password(req.password.as_deref()).await?,
            expiry_date: req
                .expiry_days
                .map(|days| expiry_from_days(days, Utc::now()))
                .transpose()?,
            is_active: req.is_active,
        };
        if changes.is_empty() {
            return Ok(share);
        }
        Ok(self.store.update_share(id, changes).await?)
    }

    pub async fn delete(&self, user_id: UserId, id: ShareId) -> Result<()> {
        self.get_owned(user_id, id).await?;
        self.store.delete_share(id).await?;
        tracing::info!(share_id = %id, "Deleted share");
        Ok(())
    }

    /// What an anonymous visitor sees before entering a password.
    pub async fn public_info(&self, token: &str) -> Result<(Share, Card)> {
        let share = self.valid_share(token).await?;
        let card = self.share_card(&share).await?;
        Ok((share, card))
    }

    /// Open a share link: check the password and count the view.
    pub async fn access(&self, token: &str, password: Option<&str>) -> Result<(Share, Card)> {
        let share = self.valid_share(token).await?;
        if let Some(hash) = share.password_hash.as_deref() {
            let Some(password) = password else {
                return Err(ApiError::forbidden("This share link requires a password"));
            };
            if !self.passwords.verify(password, hash).await? {
                return Err(ApiError::forbidden("Incorrect share password"));
            }
        }
        let card = self.share_card(&share).await?;
        let share = self.store.increment_share_views(share.id).await?;
        Ok((share, card))
    }

    async fn valid_share(&self, token: &str) -> Result<Share> {
        let share = self
            .store
            .get_share_by_token(token)
            .await?
            .ok_or_else(|| ApiError::not_found("Share link not found"))?;
        if !share.is_valid_at(Utc::now()) {
            return Err(ApiError::bad_request(
                "Share link has expired or is no longer active",
            ));
        }
        Ok(share)
    }

    async fn share_card(&self, share: &Share) -> Result<Card> {
        self.store
            .get_card(share.card_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Card not found"))
    }

    async fn hash_share_password(&self, password: Option<&str>) -> Result<Option<String>> {
        match password {
            Some(password) => {
                validate_share_password(password)?;
                Ok(Some(self.passwords.hash(password).await?))
            }
            None => Ok(None),
        }
    }
}

/// `None` days means the link never expires.
fn expiry_from_days(days: Option<i64>, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
    match days {
        Some(days) => {
            validate_expiry_days(days)?;
            Ok(Some(now + Duration::days(days)))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_from_days() {
        let now = Utc::now();
        assert_eq!(expiry_from_days(None, now).unwrap(), None);
        assert_eq!(
            expiry_from_days(Some(7), now).unwrap(),
            Some(now + Duration::days(7))
        );
        assert!(expiry_from_days(Some(0), now).is_err());
        assert!(expiry_from_days(Some(366), now).is_err());
    }
}
