//! Row structs matching the SQL schema and their conversion into domain values.
//!
//! Enum columns are stored as text; a value that no longer parses is reported
//! as [`Error::InvalidData`] instead of being silently dropped.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use moa_core::model::{
    Activity, ActivityWithCard, Card, CompletedCard, Notification, RefreshToken, Share, User,
};

use crate::{Error, Result};

fn parse_opt<T>(entity: &'static str, value: Option<String>) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = moa_core::Error>,
{
    value
        .map(|v| v.parse::<T>())
        .transpose()
        .map_err(|e| Error::invalid_data(entity, e.to_string()))
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    id: Uuid,
    login_id: String,
    password_hash: Option<String>,
    user_name: String,
    gender: Option<String>,
    interest: Option<String>,
    phone_number: Option<String>,
    profile_image_url: Option<String>,
    social_provider: Option<String>,
    social_id: Option<String>,
    is_active: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id.into(),
            login_id: row.login_id,
            password_hash: row.password_hash,
            user_name: row.user_name,
            gender: parse_opt("user", row.gender)?,
            interest: parse_opt("user", row.interest)?,
            phone_number: row.phone_number,
            profile_image_url: row.profile_image_url,
            social_provider: parse_opt("user", row.social_provider)?,
            social_id: row.social_id,
            is_active: row.is_active,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CardRow {
    id: Uuid,
    qr_code: String,
    title: String,
    description: Option<String>,
    activity_type: String,
    activity_data: Value,
    thumbnail_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CardRow> for Card {
    fn from(row: CardRow) -> Self {
        Card {
            id: row.id.into(),
            qr_code: row.qr_code,
            title: row.title,
            description: row.description,
            activity_type: row.activity_type,
            activity_data: row.activity_data,
            thumbnail_url: row.thumbnail_url,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ActivityRow {
    id: Uuid,
    user_id: Uuid,
    card_id: Uuid,
    activity_result: Value,
    completed_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<ActivityRow> for Activity {
    fn from(row: ActivityRow) -> Self {
        Activity {
            id: row.id.into(),
            user_id: row.user_id.into(),
            card_id: row.card_id.into(),
            activity_result: row.activity_result,
            completed_at: row.completed_at,
            created_at: row.created_at,
        }
    }
}

/// An activity row joined with card columns.
#[derive(Debug, FromRow)]
pub(crate) struct ActivityWithCardRow {
    #[sqlx(flatten)]
    activity: ActivityRow,
    card_title: String,
    card_thumbnail_url: Option<String>,
    activity_type: String,
}

impl From<ActivityWithCardRow> for ActivityWithCard {
    fn from(row: ActivityWithCardRow) -> Self {
        ActivityWithCard {
            activity: row.activity.into(),
            card_title: row.card_title,
            card_thumbnail_url: row.card_thumbnail_url,
            activity_type: row.activity_type,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CompletedCardRow {
    card_id: Uuid,
    title: String,
    thumbnail_url: Option<String>,
    activity_type: String,
    last_activity_date: DateTime<Utc>,
    activity_count: i64,
}

impl From<CompletedCardRow> for CompletedCard {
    fn from(row: CompletedCardRow) -> Self {
        CompletedCard {
            card_id: row.card_id.into(),
            title: row.title,
            thumbnail_url: row.thumbnail_url,
            activity_type: row.activity_type,
            last_activity_date: row.last_activity_date,
            activity_count: row.activity_count,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ShareRow {
    id: Uuid,
    user_id: Uuid,
    card_id: Uuid,
    share_token: String,
    password_hash: Option<String>,
    expiry_date: Option<DateTime<Utc>>,
    view_count: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShareRow> for Share {
    fn from(row: ShareRow) -> Self {
        Share {
            id: row.id.into(),
            user_id: row.user_id.into(),
            card_id: row.card_id.into(),
            share_token: row.share_token,
            password_hash: row.password_hash,
            expiry_date: row.expiry_date,
            view_count: row.view_count,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RefreshTokenRow {
    id: Uuid,
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    device_info: Option<String>,
    ip_address: Option<String>,
    is_revoked: bool,
    revoked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshToken {
            id: row.id.into(),
            user_id: row.user_id.into(),
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            device_info: row.device_info,
            ip_address: row.ip_address,
            is_revoked: row.is_revoked,
            revoked_at: row.revoked_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    title: String,
    message: String,
    link_url: Option<String>,
    is_read: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id.into(),
            user_id: row.user_id.into(),
            kind: row.kind,
            title: row.title,
            message: row.message,
            link_url: row.link_url,
            is_read: row.is_read,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
