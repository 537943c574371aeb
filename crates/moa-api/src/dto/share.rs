use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use moa_core::model::{Card, Share, ShareStats};
use moa_core::{CardId, ShareId, UserId};

use super::double_option;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareCreate {
    pub card_id: CardId,
    pub password: Option<String>,
    /// Absent: the configured default. `null`: never expires.
    #[serde(default, deserialize_with = "double_option")]
    pub expiry_days: Option<Option<i64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareAccessRequest {
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareUpdate {
    pub password: Option<String>,
    /// Absent: keep. `null`: never expires. `n`: now + n days.
    #[serde(default, deserialize_with = "double_option")]
    pub expiry_days: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub id: ShareId,
    pub user_id: UserId,
    pub card_id: CardId,
    pub share_token: String,
    pub share_url: String,
    pub has_password: bool,
    pub expiry_date: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShareResponse {
    pub fn new(share: Share, share_url: String) -> Self {
        Self {
            id: share.id,
            user_id: share.user_id,
            card_id: share.card_id,
            has_password: share.has_password(),
            share_token: share.share_token,
            share_url,
            expiry_date: share.expiry_date,
            view_count: share.view_count,
            is_active: share.is_active,
            created_at: share.created_at,
            updated_at: share.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareWithCardResponse {
    pub id: ShareId,
    pub user_id: UserId,
    pub card_id: CardId,
    pub card_title: String,
    pub card_thumbnail_url: Option<String>,
    pub share_token: String,
    pub share_url: String,
    pub has_password: bool,
    pub expiry_date: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ShareWithCardResponse {
    pub fn new(share: Share, card: Card, share_url: String) -> Self {
        Self {
            id: share.id,
            user_id: share.user_id,
            card_id: share.card_id,
            card_title: card.title,
            card_thumbnail_url: card.thumbnail_url,
            has_password: share.has_password(),
            share_token: share.share_token,
            share_url,
            expiry_date: share.expiry_date,
            view_count: share.view_count,
            is_active: share.is_active,
            created_at: share.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareStatsResponse {
    pub total_shares: i64,
    pub active_shares: i64,
    pub total_views: i64,
    pub most_viewed_share_id: Option<ShareId>,
}

impl From<ShareStats> for ShareStatsResponse {
    fn from(stats: ShareStats) -> Self {
        Self {
            total_shares: stats.total_shares,
            active_shares: stats.active_shares,
            total_views: stats.total_views,
            most_viewed_share_id: stats.most_viewed_share_id,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_share_update_distinguishes_null_from_absent() {
        let absent: ShareUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.expiry_days, None);

        let never: ShareUpdate = serde_json::from_str(r#"{"expiryDays": null}"#).unwrap();
        assert_eq!(never.expiry_days, Some(None));

        let days: ShareUpdate = serde_json::from_str(r#"{"expiryDays": 3}"#).unwrap();
        assert_eq!(days.expiry_days, Some(Some(3)));
    }

    #[test]
    fn test_share_create_defaults() {
        let card_id = CardId::new();
        let body = format!(r#"{{"cardId": "{card_id}"}}"#);
        let create: ShareCreate = serde_json::from_str(&body).unwrap();
        assert_eq!(create.card_id, card_id);
        assert!(create.password.is_none());
        assert!(create.expiry_days.is_none());
    }
}
