use async_trait::async_trait;
use chrono::{DateTime, Utc};

use moa_core::model::{NewRefreshToken, RefreshToken};
use moa_core::{RefreshTokenId, UserId};

use super::rows::RefreshTokenRow;
use super::{PgStore, expect_affected, map_write_error};
use crate::Result;
use crate::traits::RefreshTokenStore;

const TOKEN_COLUMNS: &str = "id, user_id, token_hash, expires_at, device_info, ip_address, \
     is_revoked, revoked_at, created_at, updated_at";

#[async_trait]
impl RefreshTokenStore for PgStore {
    async fn create_refresh_token(&self, token: NewRefreshToken) -> Result<RefreshToken> {
        let token = token.into_token(Utc::now());
        sqlx::query(&format!(
            "INSERT INTO refresh_tokens ({TOKEN_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(token.id.into_uuid())
        .bind(token.user_id.into_uuid())
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .bind(&token.device_info)
        .bind(&token.ip_address)
        .bind(token.is_revoked)
        .bind(token.revoked_at)
        .bind(token.created_at)
        .bind(token.updated_at)
        .execute(self.pool())
        .await
        .map_err(map_write_error)?;
        Ok(token)
    }

    async fn get_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE token_hash = $1"
        ))
        .bind(token_hash)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(RefreshToken::from))
    }

    async fn revoke_refresh_token(&self, id: RefreshTokenId) -> Result<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = TRUE, revoked_at = $2, updated_at = $2 \
             WHERE id = $1 AND NOT is_revoked",
        )
        .bind(id.into_uuid())
        .bind(now)
        .execute(self.pool())
        .await?;
        if result.rows_affected() > 0 {
            return Ok(true);
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM refresh_tokens WHERE id = $1)")
                .bind(id.into_uuid())
                .fetch_one(self.pool())
                .await?;
        expect_affected(u64::from(exists), "refresh token", id)?;
        Ok(false)
    }

    async fn revoke_user_refresh_tokens(&self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = TRUE, revoked_at = $2, updated_at = $2 \
             WHERE user_id = $1 AND NOT is_revoked",
        )
        .bind(user_id.into_uuid())
        .bind(Utc::now())
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_expired_refresh_tokens(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(self.pool())
            .await?;
        let removed = result.rows_affected();
        if removed > 0 {
            tracing::info!(removed, "Deleted expired refresh tokens");
        }
        Ok(removed)
    }
}
