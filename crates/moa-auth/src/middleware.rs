//! Tower bearer-token middleware.
//!
//! `AuthLayer` and `AuthService` wrap any inner service with token validation,
//! generic over [`TokenValidator`]. In [`AuthMode::Required`] a request without
//! a valid token never reaches the inner service; in [`AuthMode::Optional`] it
//! does, just without an [`AuthenticatedUser`](crate::AuthenticatedUser).

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::IntoResponse;
use http::{Request, StatusCode};
use tower::{Layer, Service};

use crate::{AuthError, AuthMode, TokenValidator};

/// Tower `Layer` that wraps services with bearer-token authentication.
pub struct AuthLayer<V: TokenValidator> {
    validator: Arc<V>,
    mode: AuthMode,
}

impl<V: TokenValidator> Clone for AuthLayer<V> {
    fn clone(&self) -> Self {
        Self {
            validator: self.validator.clone(),
            mode: self.mode,
        }
    }
}

impl<V: TokenValidator> AuthLayer<V> {
    pub fn new(validator: Arc<V>, mode: AuthMode) -> Self {
        Self { validator, mode }
    }

    pub fn required(validator: Arc<V>) -> Self {
        Self::new(validator, AuthMode::Required)
    }

    pub fn optional(validator: Arc<V>) -> Self {
        Self::new(validator, AuthMode::Optional)
    }
}

impl<V: TokenValidator, S> Layer<S> for AuthLayer<V> {
    type Service = AuthService<V, S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            validator: self.validator.clone(),
            mode: self.mode,
        }
    }
}

/// Tower `Service` that validates tokens before forwarding requests.
///
/// On success the resolved user is inserted into the request extensions.
pub struct AuthService<V: TokenValidator, S> {
    inner: S,
    validator: Arc<V>,
    mode: AuthMode,
}

impl<V: TokenValidator, S: Clone> Clone for AuthService<V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            validator: self.validator.clone(),
            mode: self.mode,
        }
    }
}

impl<V, S> Service<Request<Body>> for AuthService<V, S>
where
    V: TokenValidator,
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let validator = self.validator.clone();
        let mode = self.mode;

        Box::pin(async move {
            let token = extract_bearer_token(&req).map(str::to_string);

            match (token, mode) {
                (None, AuthMode::Optional) => {}
                (None, AuthMode::Required) => {
                    return Ok(error_response(&AuthError::MissingToken));
                }
                (Some(token), mode) => match validator.validate(&token).await {
                    Ok(user) => {
                        req.extensions_mut().insert(user);
                    }
                    Err(auth_err) if mode == AuthMode::Optional && auth_err.is_client_error() => {
                        log::debug!("Ignoring invalid optional credentials: {auth_err}");
                    }
                    Err(auth_err) => {
                        if auth_err.is_client_error() {
                            log::warn!("Authentication failed: {auth_err}");
                        } else {
                            log::error!("Authentication error: {auth_err}");
                        }
                        return Ok(error_response(&auth_err));
                    }
                },
            }

            let resp = inner
                .call(req)
                .await
                .unwrap_or_else(|infallible| match infallible {});
            Ok(resp.into_response())
        })
    }
}

/// Extract bearer token from the Authorization header.
pub(crate) fn extract_bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// JSON error body in the API's `ErrorResponse` shape.
///
/// 401 responses carry `WWW-Authenticate: Bearer`.
fn error_response(err: &AuthError) -> axum::response::Response {
    let status = err.status();
    let (code, message) = match status {
        StatusCode::UNAUTHORIZED => ("unauthorized", err.to_string()),
        StatusCode::FORBIDDEN => ("forbidden", err.to_string()),
        _ => ("internal_error", "Internal server error".to_string()),
    };
    let body = serde_json::json!({
        "success": false,
        "error": code,
        "message": message,
    });

    let mut response = (
        status,
        [(http::header::CONTENT_TYPE, "application/json")],
        serde_json::to_string(&body).unwrap_or_default(),
    )
        .into_response();

    if status == StatusCode::UNAUTHORIZED {
        response.headers_mut().insert(
            http::header::WWW_AUTHENTICATE,
            http::HeaderValue::from_static("Bearer"),
        );
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{AuthenticatedUser, Result};
    use moa_core::UserId;
    use std::sync::{LazyLock, Mutex};
    use tower::ServiceExt;

    static ALICE: LazyLock<UserId> = LazyLock::new(UserId::new);

    // Accepts "valid-token", reports "disabled-token" as inactive, rejects the rest.
    struct TestValidator;

    impl TokenValidator for TestValidator {
        fn validate(
            &self,
            token: &str,
        ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser>> + Send + '_>> {
            let token = token.to_string();
            Box::pin(async move {
                match token.as_str() {
                    "valid-token" => Ok(AuthenticatedUser { user_id: *ALICE }),
                    "disabled-token" => Err(AuthError::Inactive),
                    _ => Err(AuthError::InvalidSignature("bad token".to_string())),
                }
            })
        }
    }

    /// Mock inner service that captures the AuthenticatedUser.
    #[derive(Clone)]
    struct MockService {
        captured_user: Arc<Mutex<Option<AuthenticatedUser>>>,
    }

    impl MockService {
        fn new() -> Self {
            Self {
                captured_user: Arc::new(Mutex::new(None)),
            }
        }
    }

    impl Service<Request<Body>> for MockService {
        type Response = axum::response::Response;
        type Error = Infallible;
        type Future = Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<Body>) -> Self::Future {
            let captured = self.captured_user.clone();
            Box::pin(async move {
                let user = req.extensions().get::<AuthenticatedUser>().copied();
                *captured.lock().unwrap() = user;
                Ok((StatusCode::OK, "ok").into_response())
            })
        }
    }

    fn request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder();
        if let Some(t) = token {
            builder = builder.header("Authorization", format!("Bearer {t}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&request(Some("my-token-123"))), Some("my-token-123"));
        assert_eq!(extract_bearer_token(&request(None)), None);
        let basic = Request::builder()
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_bearer_token(&basic), None);
    }

    #[tokio::test]
    async fn test_required_missing_token_returns_401() {
        let layer = AuthLayer::required(Arc::new(TestValidator));
        let resp = layer.layer(MockService::new()).oneshot(request(None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(http::header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[tokio::test]
    async fn test_required_invalid_token_returns_401() {
        let layer = AuthLayer::required(Arc::new(TestValidator));
        let resp = layer
            .layer(MockService::new())
            .oneshot(request(Some("bad-token")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_inactive_user_returns_403() {
        let layer = AuthLayer::required(Arc::new(TestValidator));
        let resp = layer
            .layer(MockService::new())
            .oneshot(request(Some("disabled-token")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(resp.headers().get(http::header::WWW_AUTHENTICATE).is_none());
    }

    #[tokio::test]
    async fn test_required_valid_token_injects_user() {
        let mock = MockService::new();
        let captured = mock.captured_user.clone();
        let layer = AuthLayer::required(Arc::new(TestValidator));
        let resp = layer.layer(mock).oneshot(request(Some("valid-token"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(captured.lock().unwrap().unwrap().user_id, *ALICE);
    }

    #[tokio::test]
    async fn test_optional_passes_anonymous_through() {
        let mock = MockService::new();
        let captured = mock.captured_user.clone();
        let layer = AuthLayer::optional(Arc::new(TestValidator));
        let resp = layer.layer(mock).oneshot(request(None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(captured.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_optional_ignores_bad_token() {
        let mock = MockService::new();
        let captured = mock.captured_user.clone();
        let layer = AuthLayer::optional(Arc::new(TestValidator));
        let resp = layer.layer(mock).oneshot(request(Some("bad-token"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(captured.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_optional_injects_user_when_present() {
        let mock = MockService::new();
        let captured = mock.captured_user.clone();
        let layer = AuthLayer::optional(Arc::new(TestValidator));
        layer.layer(mock).oneshot(request(Some("valid-token"))).await.unwrap();
        assert_eq!(captured.lock().unwrap().unwrap().user_id, *ALICE);
    }
}
