//! Input rules shared by the HTTP layer and the admin CLI.
//!
//! Each rule returns [`Error::Validation`] carrying the offending field name,
//! so callers can surface it to clients unchanged.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::{CardChanges, NewCard, NewNotification};
use crate::{Error, Result};

/// Something that can check its own fields.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

#[allow(clippy::expect_used)]
static LOGIN_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("Invalid login id regex"));
#[allow(clippy::expect_used)]
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9-]+$").expect("Invalid phone number regex"));

const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Characters allowed in a login id, checked length, returned lowercased.
pub fn normalize_login_id(login_id: &str) -> Result<String> {
    validate_length("userId", login_id, 4, 255)?;
    if !LOGIN_ID_RE.is_match(login_id) {
        return Err(Error::validation_field(
            "userId",
            "may only contain letters, digits, '.', '_' and '-'",
        ));
    }
    Ok(login_id.to_lowercase())
}

/// 8 to 100 characters mixing at least two of letters, digits, specials.
pub fn validate_password(field: &str, password: &str) -> Result<()> {
    validate_length(field, password, 8, 100)?;
    let classes = [
        password.chars().any(|c| c.is_ascii_alphabetic()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| PASSWORD_SPECIALS.contains(c)),
    ];
    if classes.iter().filter(|present| **present).count() < 2 {
        return Err(Error::validation_field(
            field,
            "must contain at least two of: letters, digits, special characters",
        ));
    }
    Ok(())
}

pub fn validate_user_name(name: &str) -> Result<()> {
    validate_length("userName", name.trim(), 2, 100)
}

pub fn validate_phone_number(phone: &str) -> Result<()> {
    if phone.chars().count() > 20 || !PHONE_RE.is_match(phone) {
        return Err(Error::validation_field(
            "phoneNumber",
            "must be at most 20 digits or '-'",
        ));
    }
    Ok(())
}

pub fn validate_share_password(password: &str) -> Result<()> {
    validate_length("password", password, 4, 50)
}

/// Share lifetimes run from one day to one year.
pub fn validate_expiry_days(days: i64) -> Result<()> {
    validate_range("expiryDays", days, 1, 365)
}

/// Inclusive integer range check.
pub fn validate_range(field: &str, value: i64, min: i64, max: i64) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(Error::validation_field(
            field,
            format!("must be between {min} and {max}"),
        ));
    }
    Ok(())
}

/// Inclusive length check counted in characters, not bytes.
pub fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(Error::validation_field(
            field,
            format!("must be between {min} and {max} characters"),
        ));
    }
    Ok(())
}

/// Longest URL the schema stores.
pub const MAX_URL_LEN: usize = 500;

pub fn validate_url(field: &str, url: &str) -> Result<()> {
    validate_length(field, url, 0, MAX_URL_LEN)
}

fn validate_object(field: &str, value: &serde_json::Value) -> Result<()> {
    if !value.is_object() {
        return Err(Error::validation_field(field, "must be a JSON object"));
    }
    Ok(())
}

impl Validate for NewCard {
    fn validate(&self) -> Result<()> {
        validate_length("qrCode", &self.qr_code, 1, 255)?;
        validate_length("title", &self.title, 1, 255)?;
        validate_length("activityType", &self.activity_type, 1, 100)?;
        if let Some(url) = &self.thumbnail_url {
            validate_url("thumbnailUrl", url)?;
        }
        validate_object("activityData", &self.activity_data)
    }
}

impl Validate for CardChanges {
    fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            validate_length("title", title, 1, 255)?;
        }
        if let Some(kind) = &self.activity_type {
            validate_length("activityType", kind, 1, 100)?;
        }
        if let Some(data) = &self.activity_data {
            validate_object("activityData", data)?;
        }
        if let Some(url) = &self.thumbnail_url {
            validate_url("thumbnailUrl", url)?;
        }
        Ok(())
    }
}

impl Validate for NewNotification {
    fn validate(&self) -> Result<()> {
        validate_length("type", &self.kind, 1, 50)?;
        validate_length("title", &self.title, 1, 255)?;
        if self.message.trim().is_empty() {
            return Err(Error::validation_field("message", "must not be empty"));
        }
        if let Some(url) = &self.link_url {
            validate_url("linkUrl", url)?;
        }
        Ok(())
    }
}
