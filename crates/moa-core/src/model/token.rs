use chrono::{DateTime, Utc};

use crate::{RefreshTokenId, UserId};

/// A refresh token issued to one device.
///
/// Only a hash of the token is kept; the token itself never touches storage.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshToken {
    pub id: RefreshTokenId,
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    /// User-Agent of the client the token was issued to.
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
    pub is_revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Whether the token is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Usable tokens are neither revoked nor expired.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && !self.is_expired_at(now)
    }
}

/// Everything needed to store a freshly issued refresh token.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRefreshToken {
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
}

impl NewRefreshToken {
    /// Materialise the record.
    pub fn into_token(self, now: DateTime<Utc>) -> RefreshToken {
        RefreshToken {
            id: RefreshTokenId::new(),
            user_id: self.user_id,
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            device_info: self.device_info,
            ip_address: self.ip_address,
            is_revoked: false,
            revoked_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_in: Duration) -> RefreshToken {
        let now = Utc::now();
        NewRefreshToken {
            user_id: UserId::new(),
            token_hash: "abc".to_string(),
            expires_at: now + expires_in,
            device_info: None,
            ip_address: None,
        }
        .into_token(now)
    }

    #[test]
    fn test_fresh_token_is_valid() {
        assert!(token(Duration::days(7)).is_valid_at(Utc::now()));
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let t = token(Duration::seconds(-5));
        assert!(t.is_expired_at(Utc::now()));
        assert!(!t.is_valid_at(Utc::now()));
    }

    #[test]
    fn test_revoked_token_is_invalid() {
        let mut t = token(Duration::days(7));
        t.is_revoked = true;
        assert!(!t.is_valid_at(Utc::now()));
    }
}
