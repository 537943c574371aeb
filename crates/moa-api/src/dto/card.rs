use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use moa_core::CardId;
use moa_core::model::{Card, CardTotals};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardResponse {
    pub id: CardId,
    pub qr_code: String,
    pub title: String,
    pub description: Option<String>,
    pub activity_type: String,
    pub activity_data: Value,
    pub thumbnail_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Card> for CardResponse {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            qr_code: card.qr_code,
            title: card.title,
            description: card.description,
            activity_type: card.activity_type,
            activity_data: card.activity_data,
            thumbnail_url: card.thumbnail_url,
            is_active: card.is_active,
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }
}

/// `CardResponse` plus how often the card was used and shared.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetailResponse {
    #[serde(flatten)]
    pub card: CardResponse,
    pub total_activities: i64,
    pub total_shares: i64,
}

impl CardDetailResponse {
    pub fn new(card: Card, totals: CardTotals) -> Self {
        Self {
            card: card.into(),
            total_activities: totals.total_activities,
            total_shares: totals.total_shares,
        }
    }
}

/// Summary row in card listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardListResponse {
    pub id: CardId,
    pub title: String,
    pub activity_type: String,
    pub thumbnail_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Card> for CardListResponse {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            title: card.title,
            activity_type: card.activity_type,
            thumbnail_url: card.thumbnail_url,
            is_active: card.is_active,
            created_at: card.created_at,
        }
    }
}
