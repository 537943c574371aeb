//! Authentication primitives for MOA.
//!
//! Provides:
//! - [`JwtCodec`]: access/refresh token issuing and verification
//! - [`PasswordHasher`]: bcrypt hashing run off the async executor
//! - [`tokens`]: random share tokens, codes, API keys, and token hashing
//! - [`AuthLayer`] / [`AuthService`]: Tower middleware parameterised over [`TokenValidator`]
//! - [`SocialProfileProvider`]: social login profile lookup (Kakao)
//! - [`AuthError`]: auth-specific error types

mod error;
pub mod jwt;
mod middleware;
pub mod password;
pub mod social;
pub mod tokens;
mod user;

pub use error::{AuthError, Result};
pub use jwt::{Claims, IssuedToken, JwtCodec, TokenKind};
pub use middleware::{AuthLayer, AuthService};
pub use password::PasswordHasher;
pub use social::{KakaoProfileProvider, SocialProfile, SocialProfileProvider};
pub use user::{AuthenticatedUser, user_from_parts};

use std::future::Future;
use std::pin::Pin;

/// Whether a route group rejects anonymous requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// Missing or invalid credentials answer 401.
    #[default]
    Required,
    /// Anonymous requests pass through without an [`AuthenticatedUser`].
    Optional,
}

/// Validates a bearer token and resolves the user behind it.
///
/// The middleware calls `validate()` with the token taken from the
/// `Authorization` header.
pub trait TokenValidator: Send + Sync + 'static {
    fn validate(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser>> + Send + '_>>;
}

/// A bare codec accepts any well-formed access token without looking the user up.
impl TokenValidator for JwtCodec {
    fn validate(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser>> + Send + '_>> {
        let result = self
            .verify(token, TokenKind::Access)
            .map(|user_id| AuthenticatedUser { user_id });
        Box::pin(async move { result })
    }
}
