use async_trait::async_trait;
use chrono::{DateTime, Utc};

use moa_core::model::{Activity, ActivityStats, ActivityWithCard, CompletedCard, NewActivity};
use moa_core::{ActivityId, CardId, Page, UserId};

use super::rows::{ActivityRow, ActivityWithCardRow, CompletedCardRow};
use super::{PgStore, map_write_error};
use crate::Result;
use crate::traits::ActivityStore;

const ACTIVITY_COLUMNS: &str = "id, user_id, card_id, activity_result, completed_at, created_at";

#[async_trait]
impl ActivityStore for PgStore {
    async fn create_activity(&self, activity: NewActivity) -> Result<Activity> {
        let activity = activity.into_activity(Utc::now());
        sqlx::query(&format!(
            "INSERT INTO user_card_activities ({ACTIVITY_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6)"
        ))
        .bind(activity.id.into_uuid())
        .bind(activity.user_id.into_uuid())
        .bind(activity.card_id.into_uuid())
        .bind(&activity.activity_result)
        .bind(activity.completed_at)
        .bind(activity.created_at)
        .execute(self.pool())
        .await
        .map_err(map_write_error)?;
        Ok(activity)
    }

    async fn get_activity(&self, id: ActivityId) -> Result<Option<Activity>> {
        let row = sqlx::query_as::<_, ActivityRow>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM user_card_activities WHERE id = $1"
        ))
        .bind(id.into_uuid())
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Activity::from))
    }

    async fn list_user_activities(&self, user_id: UserId, page: Page) -> Result<Vec<Activity>> {
        let rows = sqlx::query_as::<_, ActivityRow>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM user_card_activities WHERE user_id = $1 \
             ORDER BY completed_at DESC, created_at DESC OFFSET $2 LIMIT $3"
        ))
        .bind(user_id.into_uuid())
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Activity::from).collect())
    }

    async fn list_user_card_activities(
        &self,
        user_id: UserId,
        card_id: CardId,
        page: Page,
    ) -> Result<Vec<Activity>> {
        let rows = sqlx::query_as::<_, ActivityRow>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM user_card_activities \
             WHERE user_id = $1 AND card_id = $2 \
             ORDER BY completed_at DESC, created_at DESC OFFSET $3 LIMIT $4"
        ))
        .bind(user_id.into_uuid())
        .bind(card_id.into_uuid())
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Activity::from).collect())
    }

    async fn count_user_activities(
        &self,
        user_id: UserId,
        card_id: Option<CardId>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_card_activities \
             WHERE user_id = $1 AND ($2::uuid IS NULL OR card_id = $2)",
        )
        .bind(user_id.into_uuid())
        .bind(card_id.map(CardId::into_uuid))
        .fetch_one(self.pool())
        .await?;
        Ok(count)
    }

    async fn completed_cards(
        &self,
        user_id: UserId,
        activity_type: Option<&str>,
        page: Page,
    ) -> Result<Vec<CompletedCard>> {
        let rows = sqlx::query_as::<_, CompletedCardRow>(
            "SELECT c.id AS card_id, c.title, c.thumbnail_url, c.activity_type, \
                    MAX(a.completed_at) AS last_activity_date, \
                    COUNT(a.id) AS activity_count \
             FROM user_card_activities a \
             JOIN cards c ON c.id = a.card_id \
             WHERE a.user_id = $1 AND ($2::text IS NULL OR c.activity_type = $2) \
             GROUP BY c.id, c.title, c.thumbnail_url, c.activity_type \
             ORDER BY last_activity_date DESC \
             OFFSET $3 LIMIT $4",
        )
        .bind(user_id.into_uuid())
        .bind(activity_type)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(CompletedCard::from).collect())
    }

    async fn recent_activities(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ActivityWithCard>> {
        let rows = sqlx::query_as::<_, ActivityWithCardRow>(
            "SELECT a.id, a.user_id, a.card_id, a.activity_result, a.completed_at, a.created_at, \
                    c.title AS card_title, c.thumbnail_url AS card_thumbnail_url, \
                    c.activity_type \
             FROM user_card_activities a \
             JOIN cards c ON c.id = a.card_id \
             WHERE a.user_id = $1 AND a.completed_at >= $2 \
             ORDER BY a.completed_at DESC, a.created_at DESC \
             LIMIT $3",
        )
        .bind(user_id.into_uuid())
        .bind(since)
        .bind(limit.max(0))
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(ActivityWithCard::from).collect())
    }

    async fn activity_stats(&self, user_id: UserId) -> Result<ActivityStats> {
        let (total_activities, unique_cards, recent_activity_date): (
            i64,
            i64,
            Option<DateTime<Utc>>,
        ) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(DISTINCT card_id), MAX(completed_at) \
             FROM user_card_activities WHERE user_id = $1",
        )
        .bind(user_id.into_uuid())
        .fetch_one(self.pool())
        .await?;
        Ok(ActivityStats {
            total_activities,
            unique_cards,
            recent_activity_date,
        })
    }
}
