use chrono::{DateTime, Utc};

use crate::{CardId, ShareId, UserId};

/// A token-addressed public link to a card.
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub id: ShareId,
    pub user_id: UserId,
    pub card_id: CardId,
    pub share_token: String,
    /// bcrypt hash of the optional access password.
    pub password_hash: Option<String>,
    /// `None` means the link never expires.
    pub expiry_date: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Share {
    /// Whether the link is protected by a password.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Whether the link has passed its expiry date at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < now)
    }

    /// A link can be opened when it is active and not expired.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now)
    }
}

/// Everything needed to insert a share link.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShare {
    pub user_id: UserId,
    pub card_id: CardId,
    pub share_token: String,
    pub password_hash: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl NewShare {
    /// Materialise the record: active, zero views.
    pub fn into_share(self, now: DateTime<Utc>) -> Share {
        Share {
            id: ShareId::new(),
            user_id: self.user_id,
            card_id: self.card_id,
            share_token: self.share_token,
            password_hash: self.password_hash,
            expiry_date: self.expiry_date,
            view_count: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Editable share fields.
///
/// `expiry_date` is doubly optional: `None` leaves it alone,
/// `Some(None)` removes the expiry, `Some(Some(t))` sets a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareChanges {
    pub password_hash: Option<String>,
    pub expiry_date: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

impl ShareChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.password_hash.is_none() && self.expiry_date.is_none() && self.is_active.is_none()
    }

    /// Apply the set fields to `share`.
    pub fn apply(self, share: &mut Share) {
        if let Some(v) = self.password_hash {
            share.password_hash = Some(v);
        }
        if let Some(v) = self.expiry_date {
            share.expiry_date = v;
        }
        if let Some(v) = self.is_active {
            share.is_active = v;
        }
    }
}

/// Per-user share summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareStats {
    pub total_shares: i64,
    pub active_shares: i64,
    pub total_views: i64,
    pub most_viewed_share_id: Option<ShareId>,
}
