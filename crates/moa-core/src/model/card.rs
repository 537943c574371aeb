use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::CardId;

/// An activity card prepared by an administrator and reached through its QR code.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub qr_code: String,
    pub title: String,
    pub description: Option<String>,
    /// e.g. `season_select`, `drawing`, `quiz`
    pub activity_type: String,
    /// Options the client needs to render the activity (JSON object).
    pub activity_data: Value,
    pub thumbnail_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert a card.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCard {
    pub qr_code: String,
    pub title: String,
    pub description: Option<String>,
    pub activity_type: String,
    pub activity_data: Value,
    pub thumbnail_url: Option<String>,
    pub is_active: bool,
}

impl NewCard {
    /// Materialise the record with a fresh id and timestamps.
    pub fn into_card(self, now: DateTime<Utc>) -> Card {
        Card {
            id: CardId::new(),
            qr_code: self.qr_code,
            title: self.title,
            description: self.description,
            activity_type: self.activity_type,
            activity_data: self.activity_data,
            thumbnail_url: self.thumbnail_url,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Card fields an administrator may edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub activity_type: Option<String>,
    pub activity_data: Option<Value>,
    pub thumbnail_url: Option<String>,
    pub is_active: Option<bool>,
}

impl CardChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.activity_type.is_none()
            && self.activity_data.is_none()
            && self.thumbnail_url.is_none()
            && self.is_active.is_none()
    }

    /// Apply the set fields to `card`.
    pub fn apply(self, card: &mut Card) {
        if let Some(v) = self.title {
            card.title = v;
        }
        if let Some(v) = self.description {
            card.description = Some(v);
        }
        if let Some(v) = self.activity_type {
            card.activity_type = v;
        }
        if let Some(v) = self.activity_data {
            card.activity_data = v;
        }
        if let Some(v) = self.thumbnail_url {
            card.thumbnail_url = Some(v);
        }
        if let Some(v) = self.is_active {
            card.is_active = v;
        }
    }
}

/// Filters for card listings. `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardFilter {
    pub activity_type: Option<String>,
    pub is_active: Option<bool>,
}

impl CardFilter {
    /// Only active cards, optionally of one activity type.
    pub fn active(activity_type: Option<String>) -> Self {
        Self {
            activity_type,
            is_active: Some(true),
        }
    }

    /// Whether `card` passes the filter.
    pub fn matches(&self, card: &Card) -> bool {
        self.activity_type
            .as_deref()
            .is_none_or(|t| card.activity_type == t)
            && self.is_active.is_none_or(|a| card.is_active == a)
    }
}

/// Usage totals shown on the administrator card detail view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardTotals {
    pub total_activities: i64,
    pub total_shares: i64,
}
