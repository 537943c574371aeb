//! Request and response bodies.
//!
//! Field names follow the public API, which is camelCase throughout except
//! for the pagination envelope.

mod activity;
mod card;
mod notification;
mod share;
mod user;

pub use activity::{
    ActivityCreate, ActivityResponse, ActivityStatsResponse, ActivityWithCardResponse,
    CompletedCardResponse,
};
pub use card::{CardDetailResponse, CardListResponse, CardResponse};
pub use notification::{
    NotificationListResponse, NotificationResponse, NotificationStatsResponse, NotificationUpdate,
};
pub use share::{
    ShareAccessRequest, ShareCreate, ShareResponse, ShareStatsResponse, ShareUpdate,
    ShareWithCardResponse,
};
pub use user::{
    LogoutRequest, PasswordChange, RefreshRequest, SocialLoginRequest, TokenResponse, UserCreate,
    UserLogin, UserProfileResponse, UserResponse, UserUpdate,
};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use moa_core::Page;

/// Generic acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// `?skip=&limit=` on list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(self) -> moa_core::Result<Page> {
        Page::new(self.skip, self.limit)
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
