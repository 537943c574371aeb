//! Bearer-token validation backed by the user store.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use moa_auth::{AuthError, AuthenticatedUser, JwtCodec, TokenKind, TokenValidator};
use moa_storage::{Store, UserStore};

/// Accepts an access token only while its user exists and is active.
pub struct StoreTokenValidator {
    jwt: Arc<JwtCodec>,
    store: Arc<dyn Store>,
}

impl StoreTokenValidator {
    pub fn new(jwt: Arc<JwtCodec>, store: Arc<dyn Store>) -> Self {
        Self { jwt, store }
    }
}

impl TokenValidator for StoreTokenValidator {
    fn validate(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = moa_auth::Result<AuthenticatedUser>> + Send + '_>> {
        let verified = self.jwt.verify(token, TokenKind::Access);
        Box::pin(async move {
            let user_id = verified?;
            let user = self
                .store
                .get_user(user_id)
                .await
                .map_err(|e| AuthError::Lookup(e.to_string()))?
                .ok_or(AuthError::UnknownUser)?;
            if !user.is_active {
                return Err(AuthError::Inactive);
            }
            Ok(AuthenticatedUser { user_id })
        })
    }
}
