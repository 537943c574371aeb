use std::sync::Arc;

use moa_auth::PasswordHasher;
use moa_core::UserId;
use moa_core::model::{User, UserChanges};
use moa_core::validation::{
    validate_password, validate_phone_number, validate_url, validate_user_name,
};
use moa_storage::{ActivityStore, RefreshTokenStore, ShareStore, Store, UserStore};

use super::load_user;
use crate::dto::{PasswordChange, UserUpdate};
use crate::error::{ApiError, Result};

/// A user together with their activity and share totals.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: User,
    pub total_activities: i64,
    pub total_shares: i64,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    passwords: PasswordHasher,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, passwords: PasswordHasher) -> Self {
        Self { store, passwords }
    }

    pub async fn get(&self, user_id: UserId) -> Result<User> {
        load_user(self.store.as_ref(), user_id).await
    }

    pub async fn profile(&self, user_id: UserId) -> Result<UserProfile> {
        let user = self.get(user_id).await?;
        let total_activities = self.store.count_user_activities(user_id, None).await?;
        let total_shares = self.store.count_user_shares(user_id, None).await?;
        Ok(UserProfile {
            user,
            total_activities,
            total_shares,
        })
    }

    pub async fn update(&self, user_id: UserId, req: UserUpdate) -> Result<User> {
        if let Some(name) = &req.user_name {
            validate_user_name(name)?;
        }
        if let Some(phone) = &req.phone_number {
            validate_phone_number(phone)?;
        }
        if let Some(url) = &req.profile_image_url {
            validate_url("profileImageUrl", url)?;
        }
        let changes = UserChanges {
            user_name: req.user_name.map(|name| name.trim().to_string()),
            gender: req.gender,
            interest: req.interest,
            phone_number: req.phone_number,
            profile_image_url: req.profile_image_url,
        };
        if changes.is_empty() {
            return self.get(user_id).await;
        }
        Ok(self.store.update_user(user_id, changes).await?)
    }

    /// Replace the password and sign the user out everywhere.
    pub async fn change_password(&self, user_id: UserId, req: PasswordChange) -> Result<()> {
        validate_password("newPassword", &req.new_password)?;
        let user = self.get(user_id).await?;
        let Some(hash) = user.password_hash.as_deref() else {
            return Err(ApiError::bad_request(
                "Accounts created through social login have no password",
            ));
        };
        if !self.passwords.verify(&req.current_password, hash).await? {
            return Err(ApiError::bad_request("Current password is incorrect"));
        }
        if req.current_password == req.new_password {
            return Err(ApiError::bad_request(
                "New password must differ from the current password",
            ));
        }

        let new_hash = self.passwords.hash(&req.new_password).await?;
        self.store.update_password(user_id, &new_hash).await?;
        let revoked = self.store.revoke_user_refresh_tokens(user_id).await?;
        tracing::info!(user_id = %user_id, revoked, "Password changed");
        Ok(())
    }

    /// Deactivate the account; data stays until an administrator deletes it.
    pub async fn withdraw(&self, user_id: UserId) -> Result<()> {
        self.store.deactivate_user(user_id).await?;
        self.store.revoke_user_refresh_tokens(user_id).await?;
        tracing::info!(user_id = %user_id, "User withdrew");
        Ok(())
    }
}
