use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use moa_core::model::{NewShare, Share, ShareChanges, ShareStats};
use moa_core::{CardId, Page, ShareId, UserId};

use super::rows::ShareRow;
use super::{PgStore, expect_affected, map_write_error};
use crate::traits::ShareStore;
use crate::{Error, Result};

const SHARE_COLUMNS: &str = "id, user_id, card_id, share_token, password_hash, expiry_date, \
     view_count, is_active, created_at, updated_at";

#[async_trait]
impl ShareStore for PgStore {
    async fn create_share(&self, share: NewShare) -> Result<Share> {
        let share = share.into_share(Utc::now());
        sqlx::query(&format!(
            "INSERT INTO shares ({SHARE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(share.id.into_uuid())
        .bind(share.user_id.into_uuid())
        .bind(share.card_id.into_uuid())
        .bind(&share.share_token)
        .bind(&share.password_hash)
        .bind(share.expiry_date)
        .bind(share.view_count)
        .bind(share.is_active)
        .bind(share.created_at)
        .bind(share.updated_at)
        .execute(self.pool())
        .await
        .map_err(map_write_error)?;
        tracing::debug!(share_id = %share.id, card_id = %share.card_id, "Inserted share");
        Ok(share)
    }

    async fn get_share(&self, id: ShareId) -> Result<Option<Share>> {
        let row = sqlx::query_as::<_, ShareRow>(&format!(
            "SELECT {SHARE_COLUMNS} FROM shares WHERE id = $1"
        ))
        .bind(id.into_uuid())
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Share::from))
    }

    async fn get_share_by_token(&self, token: &str) -> Result<Option<Share>> {
        let row = sqlx::query_as::<_, ShareRow>(&format!(
            "SELECT {SHARE_COLUMNS} FROM shares WHERE share_token = $1"
        ))
        .bind(token)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Share::from))
    }

    async fn list_user_shares(
        &self,
        user_id: UserId,
        is_active: Option<bool>,
        page: Page,
    ) -> Result<Vec<Share>> {
        let rows = sqlx::query_as::<_, ShareRow>(&format!(
            "SELECT {SHARE_COLUMNS} FROM shares \
             WHERE user_id = $1 AND ($2::boolean IS NULL OR is_active = $2) \
             ORDER BY created_at DESC, id DESC OFFSET $3 LIMIT $4"
        ))
        .bind(user_id.into_uuid())
        .bind(is_active)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Share::from).collect())
    }

    async fn count_user_shares(&self, user_id: UserId, is_active: Option<bool>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shares \
             WHERE user_id = $1 AND ($2::boolean IS NULL OR is_active = $2)",
        )
        .bind(user_id.into_uuid())
        .bind(is_active)
        .fetch_one(self.pool())
        .await?;
        Ok(count)
    }

    async fn list_card_shares(&self, card_id: CardId) -> Result<Vec<Share>> {
        let rows = sqlx::query_as::<_, ShareRow>(&format!(
            "SELECT {SHARE_COLUMNS} FROM shares WHERE card_id = $1 ORDER BY created_at DESC"
        ))
        .bind(card_id.into_uuid())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Share::from).collect())
    }

    async fn update_share(&self, id: ShareId, changes: ShareChanges) -> Result<Share> {
        // $4 says whether the expiry changes; a NULL $5 then clears it.
        let set_expiry = changes.expiry_date.is_some();
        let row = sqlx::query_as::<_, ShareRow>(&format!(
            "UPDATE shares SET \
                 password_hash = COALESCE($2, password_hash), \
                 is_active = COALESCE($3, is_active), \
                 expiry_date = CASE WHEN $4::boolean THEN $5::timestamptz ELSE expiry_date END, \
                 updated_at = $6 \
             WHERE id = $1 RETURNING {SHARE_COLUMNS}"
        ))
        .bind(id.into_uuid())
        .bind(changes.password_hash)
        .bind(changes.is_active)
        .bind(set_expiry)
        .bind(changes.expiry_date.flatten())
        .bind(Utc::now())
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| Error::not_found("share", id))?;
        Ok(row.into())
    }

    async fn increment_share_views(&self, id: ShareId) -> Result<Share> {
        let row = sqlx::query_as::<_, ShareRow>(&format!(
            "UPDATE shares SET view_count = view_count + 1 \
             WHERE id = $1 RETURNING {SHARE_COLUMNS}"
        ))
        .bind(id.into_uuid())
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| Error::not_found("share", id))?;
        Ok(row.into())
    }

    async fn deactivate_share(&self, id: ShareId) -> Result<()> {
        let result =
            sqlx::query("UPDATE shares SET is_active = FALSE, updated_at = $2 WHERE id = $1")
                .bind(id.into_uuid())
                .bind(Utc::now())
                .execute(self.pool())
                .await?;
        expect_affected(result.rows_affected(), "share", id)
    }

    async fn delete_share(&self, id: ShareId) -> Result<()> {
        let result = sqlx::query("DELETE FROM shares WHERE id = $1")
            .bind(id.into_uuid())
            .execute(self.pool())
            .await?;
        expect_affected(result.rows_affected(), "share", id)
    }

    async fn share_stats(&self, user_id: UserId) -> Result<ShareStats> {
        let (total_shares, active_shares, total_views): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE is_active), \
                    COALESCE(SUM(view_count), 0)::bigint \
             FROM shares WHERE user_id = $1",
        )
        .bind(user_id.into_uuid())
        .fetch_one(self.pool())
        .await?;

        let most_viewed: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM shares WHERE user_id = $1 AND view_count > 0 \
             ORDER BY view_count DESC, created_at DESC LIMIT 1",
        )
        .bind(user_id.into_uuid())
        .fetch_optional(self.pool())
        .await?;

        Ok(ShareStats {
            total_shares,
            active_shares,
            total_views,
            most_viewed_share_id: most_viewed.map(ShareId::from),
        })
    }
}
