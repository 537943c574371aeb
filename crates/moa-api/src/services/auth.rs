//! Registration, password and social login, token rotation, logout.
//!
//! Refresh tokens are stored only as BLAKE3 hashes. Every successful refresh
//! revokes the presented token and issues a new pair, so a stolen refresh
//! token stops working as soon as its owner refreshes.

use std::sync::Arc;

use chrono::Utc;

use moa_auth::tokens::{hash_token, verification_code};
use moa_auth::{AuthError, JwtCodec, PasswordHasher, SocialProfile, SocialProfileProvider, TokenKind};
use moa_core::UserId;
use moa_core::model::{Credentials, NewRefreshToken, NewUser, SocialProvider, User};
use moa_core::validation::{
    normalize_login_id, validate_password, validate_phone_number, validate_url,
    validate_user_name,
};
use moa_storage::{RefreshTokenStore, Store, UserStore};

use crate::dto::{SocialLoginRequest, TokenResponse, UserCreate, UserLogin};
use crate::error::{ApiError, Result};

const INVALID_CREDENTIALS: &str = "Incorrect login id or password";
const INVALID_REFRESH: &str = "Invalid refresh token";

/// Attempts at a free login id: the bare `<provider>_<id>`, then suffixed ones.
const SOCIAL_LOGIN_ID_ATTEMPTS: usize = 3;
const SOCIAL_SUFFIX_LEN: usize = 6;

/// Where a login came from, stored alongside the refresh token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    jwt: Arc<JwtCodec>,
    passwords: PasswordHasher,
    social: Arc<dyn SocialProfileProvider>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn Store>,
        jwt: Arc<JwtCodec>,
        passwords: PasswordHasher,
        social: Arc<dyn SocialProfileProvider>,
    ) -> Self {
        Self {
            store,
            jwt,
            passwords,
            social,
        }
    }

    pub async fn register(&self, req: UserCreate) -> Result<User> {
        let login_id = normalize_login_id(&req.user_id)?;
        validate_password("password", &req.password)?;
        validate_user_name(&req.user_name)?;
        if let Some(phone) = &req.phone_number {
            validate_phone_number(phone)?;
        }

        if self.store.get_user_by_login_id(&login_id).await?.is_some() {
            return Err(ApiError::bad_request("Login id is already taken"));
        }

        let hash = self.passwords.hash(&req.password).await?;
        let new_user = NewUser {
            login_id,
            credentials: Credentials::Password { hash },
            user_name: req.user_name.trim().to_string(),
            gender: req.gender,
            interest: req.interest,
            phone_number: req.phone_number,
            profile_image_url: None,
        };
        let user = self.store.create_user(new_user).await.map_err(|e| match e {
            moa_storage::Error::Duplicate { .. } => {
                ApiError::bad_request("Login id is already taken")
            }
            other => other.into(),
        })?;
        tracing::info!(user_id = %user.id, login_id = %user.login_id, "Registered user");
        Ok(user)
    }

    pub async fn login(&self, req: UserLogin, client: ClientInfo) -> Result<TokenResponse> {
        let login_id = req.user_id.trim().to_lowercase();
        let user = self
            .store
            .get_user_by_login_id(&login_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

        let Some(hash) = user.password_hash.as_deref() else {
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        };
        if !self.passwords.verify(&req.password, hash).await? {
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
        if !user.is_active {
            return Err(AuthError::Inactive.into());
        }

        if self.passwords.needs_rehash(hash) {
            let rehashed = self.passwords.hash(&req.password).await?;
            self.store.update_password(user.id, &rehashed).await?;
            tracing::debug!(user_id = %user.id, "Rehashed password at current cost");
        }

        self.store.touch_last_login(user.id, Utc::now()).await?;
        self.issue_tokens(user.id, client).await
    }

    /// Exchange a refresh token for a new pair, revoking the old one.
    pub async fn refresh(&self, refresh_token: &str, client: ClientInfo) -> Result<TokenResponse> {
        let user_id = self
            .jwt
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token rejected");
                ApiError::unauthorized(INVALID_REFRESH)
            })?;

        let stored = self
            .store
            .get_refresh_token(&hash_token(refresh_token))
            .await?
            .ok_or_else(|| ApiError::unauthorized(INVALID_REFRESH))?;
        if stored.user_id != user_id || !stored.is_valid_at(Utc::now()) {
            return Err(ApiError::unauthorized(INVALID_REFRESH));
        }

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User not found"))?;
        if !user.is_active {
            return Err(AuthError::Inactive.into());
        }

        // Another refresh with the same token got here first.
        if !self.store.revoke_refresh_token(stored.id).await? {
            return Err(ApiError::unauthorized(INVALID_REFRESH));
        }
        self.issue_tokens(user.id, client).await
    }

    /// Revoke `refresh_token` if the server knows it. Returns whether anything changed.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<bool> {
        let Some(token) = refresh_token else {
            return Ok(false);
        };
        match self.store.get_refresh_token(&hash_token(token)).await? {
            Some(stored) if !stored.is_revoked => {
                Ok(self.store.revoke_refresh_token(stored.id).await?)
            }
            _ => Ok(false),
        }
    }

    pub async fn logout_all(&self, user_id: UserId) -> Result<u64> {
        let revoked = self.store.revoke_user_refresh_tokens(user_id).await?;
        tracing::info!(user_id = %user_id, revoked, "Revoked all refresh tokens");
        Ok(revoked)
    }

    /// Sign in with a provider access token, creating the account on first use.
    pub async fn social_login(
        &self,
        req: SocialLoginRequest,
        client: ClientInfo,
    ) -> Result<TokenResponse> {
        if req.provider != self.social.provider() {
            return Err(ApiError::bad_request(format!(
                "Unsupported social provider: {}",
                req.provider
            )));
        }
        let profile = self.social.fetch_profile(&req.access_token).await?;

        let user = match self
            .store
            .get_user_by_social(profile.provider, &profile.social_id)
            .await?
        {
            Some(user) => user,
            None => self.create_social_user(profile).await?,
        };
        if !user.is_active {
            return Err(AuthError::Inactive.into());
        }

        self.store.touch_last_login(user.id, Utc::now()).await?;
        self.issue_tokens(user.id, client).await
    }

    async fn create_social_user(&self, profile: SocialProfile) -> Result<User> {
        let base_login_id = social_login_id(profile.provider, &profile.social_id);
        let user_name = profile
            .nickname
            .map(|name| name.trim().to_string())
            .filter(|name| validate_user_name(name).is_ok())
            .unwrap_or_else(|| base_login_id.clone());

        let profile_image_url = profile
            .profile_image_url
            .filter(|url| validate_url("profileImageUrl", url).is_ok());

        let mut login_id = base_login_id.clone();
        for attempt in 1..=SOCIAL_LOGIN_ID_ATTEMPTS {
            let new_user = NewUser {
                login_id: login_id.clone(),
                credentials: Credentials::Social {
                    provider: profile.provider,
                    social_id: profile.social_id.clone(),
                },
                user_name: user_name.clone(),
                gender: None,
                interest: None,
                phone_number: None,
                profile_image_url: profile_image_url.clone(),
            };
            match self.store.create_user(new_user).await {
                Ok(user) => {
                    tracing::info!(
                        user_id = %user.id,
                        provider = %profile.provider,
                        login_id = %user.login_id,
                        "Created social user"
                    );
                    return Ok(user);
                }
                Err(moa_storage::Error::Duplicate {
                    field: "login id", ..
                }) if attempt < SOCIAL_LOGIN_ID_ATTEMPTS => {
                    tracing::debug!(login_id = %login_id, "Social login id taken, adding a suffix");
                    login_id = format!("{base_login_id}_{}", verification_code(SOCIAL_SUFFIX_LEN));
                }
                // Another request created the same social account first.
                Err(moa_storage::Error::Duplicate {
                    field: "social account",
                    ..
                }) => {
                    return self
                        .store
                        .get_user_by_social(profile.provider, &profile.social_id)
                        .await?
                        .ok_or_else(|| ApiError::conflict("Social account is already registered"));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ApiError::conflict("Could not allocate a login id for the social account"))
    }

    async fn issue_tokens(&self, user_id: UserId, client: ClientInfo) -> Result<TokenResponse> {
        let access = self.jwt.issue_access(user_id)?;
        let refresh = self.jwt.issue_refresh(user_id)?;
        self.store
            .create_refresh_token(NewRefreshToken {
                user_id,
                token_hash: hash_token(&refresh.token),
                expires_at: refresh.expires_at,
                device_info: client.device_info,
                ip_address: client.ip_address,
            })
            .await?;
        Ok(TokenResponse {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: "bearer",
            expires_in: self.jwt.access_ttl().num_seconds(),
        })
    }
}

/// Login id given to accounts created through a provider, e.g. `kakao_12345`.
fn social_login_id(provider: SocialProvider, social_id: &str) -> String {
    format!("{}_{}", provider.as_str(), social_id)
}
