use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use moa_core::UserId;
use moa_core::model::{Gender, Interest, SocialProvider, User};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub user_id: String,
    pub password: String,
    pub user_name: String,
    pub gender: Option<Gender>,
    pub interest: Option<Interest>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLogin {
    pub user_id: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLoginRequest {
    pub provider: SocialProvider,
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub user_name: Option<String>,
    pub gender: Option<Gender>,
    pub interest: Option<Interest>,
    pub phone_number: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub user_id: String,
    pub user_name: String,
    pub gender: Option<Gender>,
    pub interest: Option<Interest>,
    pub phone_number: Option<String>,
    pub profile_image_url: Option<String>,
    pub social_provider: Option<SocialProvider>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_id: user.login_id,
            user_name: user.user_name,
            gender: user.gender,
            interest: user.interest,
            phone_number: user.phone_number,
            profile_image_url: user.profile_image_url,
            social_provider: user.social_provider,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// `UserResponse` plus activity and share totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub total_activities: i64,
    pub total_shares: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}
