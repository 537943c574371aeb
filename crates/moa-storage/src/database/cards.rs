use async_trait::async_trait;
use chrono::Utc;

use moa_core::model::{Card, CardChanges, CardFilter, CardTotals, NewCard};
use moa_core::{CardId, Page};

use super::rows::CardRow;
use super::{PgStore, expect_affected, map_write_error};
use crate::{Error, Result};
use crate::traits::CardStore;

const CARD_COLUMNS: &str = "id, qr_code, title, description, activity_type, activity_data, \
     thumbnail_url, is_active, created_at, updated_at";

/// `$1` is the activity type, `$2` the active flag; NULL means "any".
const CARD_FILTER: &str =
    "($1::text IS NULL OR activity_type = $1) AND ($2::boolean IS NULL OR is_active = $2)";

#[async_trait]
impl CardStore for PgStore {
    async fn create_card(&self, card: NewCard) -> Result<Card> {
        let card = card.into_card(Utc::now());
        sqlx::query(&format!(
            "INSERT INTO cards ({CARD_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(card.id.into_uuid())
        .bind(&card.qr_code)
        .bind(&card.title)
        .bind(&card.description)
        .bind(&card.activity_type)
        .bind(&card.activity_data)
        .bind(&card.thumbnail_url)
        .bind(card.is_active)
        .bind(card.created_at)
        .bind(card.updated_at)
        .execute(self.pool())
        .await
        .map_err(map_write_error)?;
        tracing::debug!(card_id = %card.id, qr_code = %card.qr_code, "Inserted card");
        Ok(card)
    }

    async fn get_card(&self, id: CardId) -> Result<Option<Card>> {
        let row = sqlx::query_as::<_, CardRow>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE id = $1"
        ))
        .bind(id.into_uuid())
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Card::from))
    }

    async fn get_card_by_qr(&self, qr_code: &str) -> Result<Option<Card>> {
        let row = sqlx::query_as::<_, CardRow>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE qr_code = $1"
        ))
        .bind(qr_code)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Card::from))
    }

    async fn list_cards(&self, filter: &CardFilter, page: Page) -> Result<Vec<Card>> {
        let rows = sqlx::query_as::<_, CardRow>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE {CARD_FILTER} \
             ORDER BY created_at DESC, id DESC OFFSET $3 LIMIT $4"
        ))
        .bind(filter.activity_type.as_deref())
        .bind(filter.is_active)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Card::from).collect())
    }

    async fn count_cards(&self, filter: &CardFilter) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM cards WHERE {CARD_FILTER}"))
                .bind(filter.activity_type.as_deref())
                .bind(filter.is_active)
                .fetch_one(self.pool())
                .await?;
        Ok(count)
    }

    async fn update_card(&self, id: CardId, changes: CardChanges) -> Result<Card> {
        let row = sqlx::query_as::<_, CardRow>(&format!(
            "UPDATE cards SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 activity_type = COALESCE($4, activity_type), \
                 activity_data = COALESCE($5, activity_data), \
                 thumbnail_url = COALESCE($6, thumbnail_url), \
                 is_active = COALESCE($7, is_active), \
                 updated_at = $8 \
             WHERE id = $1 RETURNING {CARD_COLUMNS}"
        ))
        .bind(id.into_uuid())
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.activity_type)
        .bind(changes.activity_data)
        .bind(changes.thumbnail_url)
        .bind(changes.is_active)
        .bind(Utc::now())
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| Error::not_found("card", id))?;
        Ok(row.into())
    }

    async fn deactivate_card(&self, id: CardId) -> Result<()> {
        let result =
            sqlx::query("UPDATE cards SET is_active = FALSE, updated_at = $2 WHERE id = $1")
                .bind(id.into_uuid())
                .bind(Utc::now())
                .execute(self.pool())
                .await?;
        expect_affected(result.rows_affected(), "card", id)
    }

    async fn delete_card(&self, id: CardId) -> Result<()> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id.into_uuid())
            .execute(self.pool())
            .await?;
        expect_affected(result.rows_affected(), "card", id)
    }

    async fn card_totals(&self, id: CardId) -> Result<CardTotals> {
        let (total_activities, total_shares): (i64, i64) = sqlx::query_as(
            "SELECT \
                 (SELECT COUNT(*) FROM user_card_activities WHERE card_id = $1), \
                 (SELECT COUNT(*) FROM shares WHERE card_id = $1)",
        )
        .bind(id.into_uuid())
        .fetch_one(self.pool())
        .await?;
        Ok(CardTotals {
            total_activities,
            total_shares,
        })
    }
}
