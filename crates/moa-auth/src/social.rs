//! Social login profile lookup.
//!
//! The client completes the provider's OAuth flow itself and hands the API an
//! access token; the server only asks the provider who that token belongs to.

use std::future::Future;
use std::pin::Pin;

use moa_core::model::SocialProvider;
use serde::Deserialize;

use crate::{AuthError, Result};

/// Kakao's user info endpoint.
pub const KAKAO_USERINFO_URL: &str = "https://kapi.kakao.com/v2/user/me";

/// Who a social access token belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialProfile {
    pub provider: SocialProvider,
    pub social_id: String,
    pub nickname: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Resolves a provider access token to a profile.
pub trait SocialProfileProvider: Send + Sync + 'static {
    fn provider(&self) -> SocialProvider;

    fn fetch_profile(
        &self,
        access_token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<SocialProfile>> + Send + '_>>;
}

#[derive(Debug, Deserialize)]
struct KakaoUserResponse {
    id: i64,
    #[serde(default)]
    kakao_account: Option<KakaoAccount>,
    #[serde(default)]
    properties: Option<KakaoProperties>,
}

#[derive(Debug, Deserialize)]
struct KakaoAccount {
    #[serde(default)]
    profile: Option<KakaoProfile>,
}

#[derive(Debug, Deserialize)]
struct KakaoProfile {
    nickname: Option<String>,
    profile_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KakaoProperties {
    nickname: Option<String>,
    profile_image: Option<String>,
}

impl KakaoUserResponse {
    fn into_profile(self) -> SocialProfile {
        let (account_nick, account_image) = self
            .kakao_account
            .and_then(|a| a.profile)
            .map(|p| (p.nickname, p.profile_image_url))
            .unwrap_or_default();
        let (prop_nick, prop_image) = self
            .properties
            .map(|p| (p.nickname, p.profile_image))
            .unwrap_or_default();
        SocialProfile {
            provider: SocialProvider::Kakao,
            social_id: self.id.to_string(),
            nickname: account_nick.or(prop_nick),
            profile_image_url: account_image.or(prop_image),
        }
    }
}

/// Looks up Kakao users through the user info endpoint.
pub struct KakaoProfileProvider {
    http_client: reqwest::Client,
    userinfo_url: String,
}

impl KakaoProfileProvider {
    pub fn new(userinfo_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            userinfo_url: userinfo_url.into(),
        }
    }

    async fn lookup(&self, access_token: &str) -> Result<SocialProfile> {
        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(format!("kakao request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AuthError::ProviderRejected(format!(
                "Kakao rejected the access token (HTTP {status})"
            )));
        }
        if !status.is_success() {
            return Err(AuthError::ProviderUnavailable(format!(
                "Kakao answered HTTP {status}"
            )));
        }

        let body: KakaoUserResponse = response.json().await.map_err(|e| {
            AuthError::ProviderUnavailable(format!("kakao response parse failed: {e}"))
        })?;
        let profile = body.into_profile();
        log::info!("Kakao profile resolved for social id {}", profile.social_id);
        Ok(profile)
    }
}

impl Default for KakaoProfileProvider {
    fn default() -> Self {
        Self::new(KAKAO_USERINFO_URL)
    }
}

impl SocialProfileProvider for KakaoProfileProvider {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Kakao
    }

    fn fetch_profile(
        &self,
        access_token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<SocialProfile>> + Send + '_>> {
        let token = access_token.to_string();
        Box::pin(async move { self.lookup(&token).await })
    }
}
