//! Authenticated caller identity.

use moa_core::UserId;

/// The caller behind a validated access token.
///
/// Inserted into request extensions by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Extract the `AuthenticatedUser` from HTTP request `Parts`, if present.
pub fn user_from_parts(parts: &http::request::Parts) -> Option<AuthenticatedUser> {
    parts.extensions.get::<AuthenticatedUser>().copied()
}
