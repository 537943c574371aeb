use std::sync::Arc;

use chrono::{Duration, Utc};

use moa_core::model::{Activity, ActivityStats, ActivityWithCard, CompletedCard, NewActivity};
use moa_core::validation::validate_range;
use moa_core::{ActivityId, CardId, Page, Paginated, UserId};
use moa_storage::{ActivityStore, CardStore, Store};

use super::ensure_owner;
use crate::dto::ActivityCreate;
use crate::error::{ApiError, Result};

/// Default look-back window of the recent archive, in days.
pub const DEFAULT_RECENT_DAYS: i64 = 30;

#[derive(Clone)]
pub struct ActivityService {
    store: Arc<dyn Store>,
}

impl ActivityService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn record(&self, user_id: UserId, req: ActivityCreate) -> Result<Activity> {
        if !req.activity_result.is_object() {
            return Err(ApiError::validation(
                "activityResult",
                "must be a JSON object",
            ));
        }
        let card = self
            .store
            .get_card(req.card_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Card not found"))?;
        if !card.is_active {
            return Err(ApiError::bad_request("Card is not active"));
        }

        let activity = self
            .store
            .create_activity(NewActivity {
                user_id,
                card_id: card.id,
                activity_result: req.activity_result,
            })
            .await?;
        tracing::info!(user_id = %user_id, card_id = %card.id, "Recorded activity");
        Ok(activity)
    }

    pub async fn list_mine(&self, user_id: UserId, page: Page) -> Result<Paginated<Activity>> {
        let items = self.store.list_user_activities(user_id, page).await?;
        let total = self.store.count_user_activities(user_id, None).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn get(&self, user_id: UserId, id: ActivityId) -> Result<Activity> {
        let activity = self
            .store
            .get_activity(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Activity not found"))?;
        ensure_owner(activity.user_id, user_id, "activity")?;
        Ok(activity)
    }

    pub async fn stats(&self, user_id: UserId) -> Result<ActivityStats> {
        Ok(self.store.activity_stats(user_id).await?)
    }

    /// Cards the user has worked on, most recently active first.
    pub async fn completed_cards(
        &self,
        user_id: UserId,
        activity_type: Option<&str>,
        page: Page,
    ) -> Result<Vec<CompletedCard>> {
        Ok(self
            .store
            .completed_cards(user_id, activity_type, page)
            .await?)
    }

    /// Activities of the last `days` days joined with their cards.
    pub async fn recent(
        &self,
        user_id: UserId,
        days: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<ActivityWithCard>> {
        let days = days.unwrap_or(DEFAULT_RECENT_DAYS);
        validate_range("days", days, 1, 365)?;
        let limit = limit.unwrap_or(moa_core::pagination::DEFAULT_LIMIT);
        validate_range("limit", limit, 1, moa_core::pagination::MAX_LIMIT)?;

        let since = Utc::now() - Duration::days(days);
        Ok(self.store.recent_activities(user_id, since, limit).await?)
    }

    /// The user's activities on one card, newest first.
    pub async fn card_activities(
        &self,
        user_id: UserId,
        card_id: CardId,
        page: Page,
    ) -> Result<Vec<Activity>> {
        if self.store.get_card(card_id).await?.is_none() {
            return Err(ApiError::not_found("Card not found"));
        }
        Ok(self
            .store
            .list_user_card_activities(user_id, card_id, page)
            .await?)
    }
}
