use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use moa_core::model::{Activity, ActivityStats, ActivityWithCard, CompletedCard};
use moa_core::{ActivityId, CardId, UserId};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCreate {
    pub card_id: CardId,
    pub activity_result: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: ActivityId,
    pub user_id: UserId,
    pub card_id: CardId,
    pub activity_result: Value,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            user_id: activity.user_id,
            card_id: activity.card_id,
            activity_result: activity.activity_result,
            completed_at: activity.completed_at,
            created_at: activity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityWithCardResponse {
    pub id: ActivityId,
    pub user_id: UserId,
    pub card_id: CardId,
    pub card_title: String,
    pub card_thumbnail_url: Option<String>,
    pub activity_type: String,
    pub activity_result: Value,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityWithCard> for ActivityWithCardResponse {
    fn from(item: ActivityWithCard) -> Self {
        let ActivityWithCard {
            activity,
            card_title,
            card_thumbnail_url,
            activity_type,
        } = item;
        Self {
            id: activity.id,
            user_id: activity.user_id,
            card_id: activity.card_id,
            card_title,
            card_thumbnail_url,
            activity_type,
            activity_result: activity.activity_result,
            completed_at: activity.completed_at,
            created_at: activity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStatsResponse {
    pub total_activities: i64,
    pub unique_cards: i64,
    pub recent_activity_date: Option<DateTime<Utc>>,
}

impl From<ActivityStats> for ActivityStatsResponse {
    fn from(stats: ActivityStats) -> Self {
        Self {
            total_activities: stats.total_activities,
            unique_cards: stats.unique_cards,
            recent_activity_date: stats.recent_activity_date,
        }
    }
}

/// A card in the user's archive.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCardResponse {
    pub card_id: CardId,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub activity_type: String,
    pub last_activity_date: DateTime<Utc>,
    pub activity_count: i64,
}

impl From<CompletedCard> for CompletedCardResponse {
    fn from(card: CompletedCard) -> Self {
        Self {
            card_id: card.card_id,
            title: card.title,
            thumbnail_url: card.thumbnail_url,
            activity_type: card.activity_type,
            last_activity_date: card.last_activity_date,
            activity_count: card.activity_count,
        }
    }
}
