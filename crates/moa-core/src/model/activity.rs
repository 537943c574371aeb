use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{ActivityId, CardId, UserId};

/// What a user chose or entered while working through a card.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: ActivityId,
    pub user_id: UserId,
    pub card_id: CardId,
    pub activity_result: Value,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to record an activity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub user_id: UserId,
    pub card_id: CardId,
    pub activity_result: Value,
}

impl NewActivity {
    /// Materialise the record; the activity counts as completed at `now`.
    pub fn into_activity(self, now: DateTime<Utc>) -> Activity {
        Activity {
            id: ActivityId::new(),
            user_id: self.user_id,
            card_id: self.card_id,
            activity_result: self.activity_result,
            completed_at: now,
            created_at: now,
        }
    }
}

/// An activity joined with the card it was recorded against.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityWithCard {
    pub activity: Activity,
    pub card_title: String,
    pub card_thumbnail_url: Option<String>,
    pub activity_type: String,
}

/// One card in a user's archive, with how often and how recently it was done.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedCard {
    pub card_id: CardId,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub activity_type: String,
    pub last_activity_date: DateTime<Utc>,
    pub activity_count: i64,
}

/// Per-user activity summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityStats {
    pub total_activities: i64,
    pub unique_cards: i64,
    pub recent_activity_date: Option<DateTime<Utc>>,
}
