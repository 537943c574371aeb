//! Extractors that answer with [`ApiError`] bodies instead of axum's plain-text rejections.

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use moa_auth::user_from_parts;
use moa_core::UserId;

use crate::error::ApiError;
use crate::services::ClientInfo;

const MAX_DEVICE_INFO: usize = 500;
const MAX_IP_ADDRESS: usize = 45;

/// JSON body extractor and response.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        let Self(value) = self;
        axum::Json(value).into_response()
    }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

/// The caller on a route behind the required auth layer.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts)
            .map(|user| CurrentUser(user.user_id))
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
    }
}

/// The caller, if any, on a route behind the optional auth layer.
#[derive(Debug, Clone, Copy)]
pub struct OptionalUser(pub Option<UserId>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(user_from_parts(parts).map(|user| user.user_id)))
    }
}

/// Device and address recorded with each refresh token.
impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        let device_info = header("user-agent").map(|ua| truncate(ua, MAX_DEVICE_INFO));
        let ip_address = header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .or_else(|| header("x-real-ip"))
            .map(|ip| truncate(ip, MAX_IP_ADDRESS));
        Ok(ClientInfo {
            device_info,
            ip_address,
        })
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn client_info(req: Request<()>) -> ClientInfo {
        let (mut parts, _) = req.into_parts();
        ClientInfo::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_client_info_prefers_first_forwarded_address() {
        let req = Request::builder()
            .header("user-agent", "moa-app/1.0")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "10.0.0.2")
            .body(())
            .unwrap();
        let info = client_info(req).await;
        assert_eq!(info.device_info.as_deref(), Some("moa-app/1.0"));
        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.7"));
    }

    #[tokio::test]
    async fn test_client_info_falls_back_to_real_ip() {
        let req = Request::builder()
            .header("x-real-ip", "198.51.100.4")
            .body(())
            .unwrap();
        let info = client_info(req).await;
        assert_eq!(info.device_info, None);
        assert_eq!(info.ip_address.as_deref(), Some("198.51.100.4"));
    }

    #[tokio::test]
    async fn test_client_info_truncates_long_user_agent() {
        let req = Request::builder()
            .header("user-agent", "x".repeat(800))
            .body(())
            .unwrap();
        let info = client_info(req).await;
        assert_eq!(info.device_info.unwrap().len(), MAX_DEVICE_INFO);
    }

    #[tokio::test]
    async fn test_current_user_rejects_anonymous() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let err = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
