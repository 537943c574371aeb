use chrono::{DateTime, Utc};

use super::{Gender, Interest, SocialProvider};
use crate::UserId;

/// A user account.
///
/// An account signs in either with a password or through a social provider,
/// never both: `password_hash` is set exactly when `social_provider` and
/// `social_id` are not.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    /// Login id, stored lowercase.
    pub login_id: String,
    /// bcrypt hash; `None` for social accounts.
    pub password_hash: Option<String>,
    pub user_name: String,
    pub gender: Option<Gender>,
    pub interest: Option<Interest>,
    pub phone_number: Option<String>,
    pub profile_image_url: Option<String>,
    pub social_provider: Option<SocialProvider>,
    pub social_id: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account can sign in with a password.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Whether the account was created through a social provider.
    pub fn is_social(&self) -> bool {
        self.social_provider.is_some()
    }
}

/// How a new account authenticates.
#[derive(Debug, Clone, PartialEq)]
pub enum Credentials {
    /// Login id + password; carries the already-computed hash.
    Password {
        /// bcrypt hash
        hash: String,
    },
    /// Social login.
    Social {
        /// Provider the account belongs to
        provider: SocialProvider,
        /// Provider-side user id
        social_id: String,
    },
}

/// Everything needed to insert a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub login_id: String,
    pub credentials: Credentials,
    pub user_name: String,
    pub gender: Option<Gender>,
    pub interest: Option<Interest>,
    pub phone_number: Option<String>,
    pub profile_image_url: Option<String>,
}

impl NewUser {
    /// Materialise the record with a fresh id and timestamps.
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        let (password_hash, social_provider, social_id) = match self.credentials {
            Credentials::Password { hash } => (Some(hash), None, None),
            Credentials::Social {
                provider,
                social_id,
            } => (None, Some(provider), Some(social_id)),
        };
        User {
            id: UserId::new(),
            login_id: self.login_id,
            password_hash,
            user_name: self.user_name,
            gender: self.gender,
            interest: self.interest,
            phone_number: self.phone_number,
            profile_image_url: self.profile_image_url,
            social_provider,
            social_id,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Profile fields a user may edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub user_name: Option<String>,
    pub gender: Option<Gender>,
    pub interest: Option<Interest>,
    pub phone_number: Option<String>,
    pub profile_image_url: Option<String>,
}

impl UserChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.user_name.is_none()
            && self.gender.is_none()
            && self.interest.is_none()
            && self.phone_number.is_none()
            && self.profile_image_url.is_none()
    }

    /// Apply the set fields to `user`.
    pub fn apply(self, user: &mut User) {
        if let Some(v) = self.user_name {
            user.user_name = v;
        }
        if let Some(v) = self.gender {
            user.gender = Some(v);
        }
        if let Some(v) = self.interest {
            user.interest = Some(v);
        }
        if let Some(v) = self.phone_number {
            user.phone_number = Some(v);
        }
        if let Some(v) = self.profile_image_url {
            user.profile_image_url = Some(v);
        }
    }
}
