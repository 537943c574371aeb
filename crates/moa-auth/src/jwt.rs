//! HMAC-signed access and refresh tokens.
//!
//! Both kinds carry `{sub, exp, iat, type, jti}`. The `type` claim keeps a
//! refresh token from being replayed as an access token and the other way
//! round; `jti` makes every issued token unique even within one second.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use moa_core::UserId;
use moa_core::config::JwtConfig;

use crate::{AuthError, Result};

/// Which of the two token kinds a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Registered and private claims carried by every MOA token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub jti: String,
}

/// A freshly signed token with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies MOA tokens with a shared secret.
#[derive(Clone)]
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtCodec {
    /// Build a codec. Only the HMAC family (HS256/HS384/HS512) is accepted.
    pub fn new(
        secret: &str,
        algorithm: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self> {
        if secret.is_empty() {
            return Err(AuthError::Config("JWT secret is empty".to_string()));
        }
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| AuthError::Config(format!("unknown JWT algorithm '{algorithm}'")))?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::Config(format!(
                "JWT algorithm {algorithm:?} needs key pairs; use HS256, HS384 or HS512"
            )));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn from_config(config: &JwtConfig) -> Result<Self> {
        let access_ttl = Duration::try_minutes(config.access_token_expire_minutes)
            .ok_or_else(|| AuthError::Config("access token lifetime is out of range".to_string()))?;
        let refresh_ttl = Duration::try_days(config.refresh_token_expire_days)
            .ok_or_else(|| AuthError::Config("refresh token lifetime is out of range".to_string()))?;
        Self::new(&config.secret_key, &config.algorithm, access_ttl, refresh_ttl)
    }

    /// Lifetime of access tokens, reported to clients as `expiresIn`.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn issue_access(&self, user_id: UserId) -> Result<IssuedToken> {
        self.issue(user_id, TokenKind::Access, self.access_ttl)
    }

    pub fn issue_refresh(&self, user_id: UserId) -> Result<IssuedToken> {
        self.issue(user_id, TokenKind::Refresh, self.refresh_ttl)
    }

    fn issue(&self, user_id: UserId, kind: TokenKind, ttl: Duration) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Signing(format!("{} token lifetime overflows", kind.as_str())))?;
        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            kind,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature, expiry, and kind, returning the subject.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<UserId> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if data.claims.kind != kind {
            return Err(AuthError::WrongTokenType {
                expected: kind.as_str(),
            });
        }
        UserId::from_str(&data.claims.sub)
            .map_err(|_| AuthError::InvalidFormat("subject is not a user id".to_string()))
    }

    /// Read claims without checking signature or expiry.
    pub fn decode_unverified(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        Ok(decode::<Claims>(token, &self.decoding, &validation)?.claims)
    }

    /// Expiry of a token, if it decodes.
    pub fn expiration(&self, token: &str) -> Option<DateTime<Utc>> {
        let claims = self.decode_unverified(token).ok()?;
        Utc.timestamp_opt(claims.exp, 0).single()
    }

    /// Undecodable tokens count as expired.
    pub fn is_expired(&self, token: &str) -> bool {
        self.expiration(token)
            .is_none_or(|expires_at| expires_at <= Utc::now())
    }
}
