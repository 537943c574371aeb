//! Auth-specific error types.

use http::StatusCode;

/// Errors that can occur while authenticating a caller.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header or bearer token present.
    #[error("missing authentication token")]
    MissingToken,

    /// Token could not be decoded at all.
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    /// Signature verification failed.
    #[error("invalid token signature: {0}")]
    InvalidSignature(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// An access token was presented where a refresh token was expected, or vice versa.
    #[error("wrong token type: expected {expected}")]
    WrongTokenType { expected: &'static str },

    /// Refresh token was revoked or is unknown to the server.
    #[error("token has been revoked")]
    Revoked,

    /// Token subject does not name an existing user.
    #[error("user not found")]
    UnknownUser,

    /// The user exists but the account is deactivated.
    #[error("account is inactive")]
    Inactive,

    /// Login id or password did not match.
    #[error("incorrect login id or password")]
    InvalidCredentials,

    /// The social provider rejected the access token.
    #[error("social provider rejected the token: {0}")]
    ProviderRejected(String),

    /// The social provider could not be reached or answered garbage.
    #[error("social provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Key material or algorithm is misconfigured.
    #[error("auth configuration error: {0}")]
    Config(String),

    /// Token could not be signed.
    #[error("failed to sign token: {0}")]
    Signing(String),

    /// bcrypt failed or its worker thread died.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// The user behind a token could not be looked up.
    #[error("user lookup failed: {0}")]
    Lookup(String),
}

/// Convenience `Result` alias for moa-auth.
pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Whether this error is the caller's fault (vs. a server problem).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidFormat(_)
                | AuthError::InvalidSignature(_)
                | AuthError::Expired
                | AuthError::WrongTokenType { .. }
                | AuthError::Revoked
                | AuthError::UnknownUser
                | AuthError::Inactive
                | AuthError::InvalidCredentials
                | AuthError::ProviderRejected(_)
        )
    }

    /// HTTP status the middleware answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Inactive => StatusCode::FORBIDDEN,
            e if e.is_client_error() => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature(e.to_string()),
            _ => AuthError::InvalidFormat(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        assert_eq!(
            AuthError::MissingToken.to_string(),
            "missing authentication token"
        );
        assert_eq!(
            AuthError::WrongTokenType { expected: "refresh" }.to_string(),
            "wrong token type: expected refresh"
        );
    }

    #[test]
    fn test_is_client_error() {
        assert!(AuthError::MissingToken.is_client_error());
        assert!(AuthError::Expired.is_client_error());
        assert!(!AuthError::Hashing("boom".into()).is_client_error());
        assert!(!AuthError::ProviderUnavailable("down".into()).is_client_error());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::Revoked.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Inactive.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::Config("bad".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
