use async_trait::async_trait;
use chrono::{DateTime, Utc};

use moa_core::UserId;
use moa_core::model::{NewUser, SocialProvider, User, UserChanges};

use super::rows::UserRow;
use super::{PgStore, expect_affected, map_write_error};
use crate::Result;
use crate::traits::UserStore;

const USER_COLUMNS: &str = "id, login_id, password_hash, user_name, gender, interest, \
     phone_number, profile_image_url, social_provider, social_id, is_active, \
     last_login_at, created_at, updated_at";

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let user = user.into_user(Utc::now());
        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        ))
        .bind(user.id.into_uuid())
        .bind(&user.login_id)
        .bind(&user.password_hash)
        .bind(&user.user_name)
        .bind(user.gender.map(|g| g.as_str()))
        .bind(user.interest.map(|i| i.as_str()))
        .bind(&user.phone_number)
        .bind(&user.profile_image_url)
        .bind(user.social_provider.map(|p| p.as_str()))
        .bind(&user.social_id)
        .bind(user.is_active)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool())
        .await
        .map_err(map_write_error)?;
        tracing::debug!(user_id = %user.id, "Inserted user");
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.into_uuid())
            .fetch_optional(self.pool())
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_user_by_login_id(&self, login_id: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE login_id = $1"
        ))
        .bind(login_id)
        .fetch_optional(self.pool())
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn get_user_by_social(
        &self,
        provider: SocialProvider,
        social_id: &str,
    ) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE social_provider = $1 AND social_id = $2"
        ))
        .bind(provider.as_str())
        .bind(social_id)
        .fetch_optional(self.pool())
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET \
                 user_name = COALESCE($2, user_name), \
                 gender = COALESCE($3, gender), \
                 interest = COALESCE($4, interest), \
                 phone_number = COALESCE($5, phone_number), \
                 profile_image_url = COALESCE($6, profile_image_url), \
                 updated_at = $7 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id.into_uuid())
        .bind(changes.user_name)
        .bind(changes.gender.map(|g| g.as_str()))
        .bind(changes.interest.map(|i| i.as_str()))
        .bind(changes.phone_number)
        .bind(changes.profile_image_url)
        .bind(Utc::now())
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| crate::Error::not_found("user", id))?;
        User::try_from(row)
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
                .bind(id.into_uuid())
                .bind(password_hash)
                .bind(Utc::now())
                .execute(self.pool())
                .await?;
        expect_affected(result.rows_affected(), "user", id)
    }

    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(id.into_uuid())
            .bind(at)
            .execute(self.pool())
            .await?;
        expect_affected(result.rows_affected(), "user", id)
    }

    async fn deactivate_user(&self, id: UserId) -> Result<()> {
        let result =
            sqlx::query("UPDATE users SET is_active = FALSE, updated_at = $2 WHERE id = $1")
                .bind(id.into_uuid())
                .bind(Utc::now())
                .execute(self.pool())
                .await?;
        expect_affected(result.rows_affected(), "user", id)
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.into_uuid())
            .execute(self.pool())
            .await?;
        expect_affected(result.rows_affected(), "user", id)
    }
}
