//! Shared harness: the full router over a `MemoryStore`.

#![allow(dead_code, clippy::unwrap_used)]

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use moa_api::{AppState, Server};
use moa_auth::{AuthError, SocialProfile, SocialProfileProvider};
use moa_core::MoaConfig;
use moa_core::model::{Card, NewCard, SocialProvider};
use moa_storage::MemoryStore;

pub const PASSWORD: &str = "password123";
pub const KAKAO_TOKEN: &str = "kakao-good-token";

/// Accepts [`KAKAO_TOKEN`] as user 4242; rejects everything else.
pub struct StubKakao;

impl SocialProfileProvider for StubKakao {
    fn provider(&self) -> SocialProvider {
        SocialProvider::Kakao
    }

    fn fetch_profile(
        &self,
        access_token: &str,
    ) -> Pin<Box<dyn Future<Output = moa_auth::Result<SocialProfile>> + Send + '_>> {
        let result = if access_token == KAKAO_TOKEN {
            Ok(SocialProfile {
                provider: SocialProvider::Kakao,
                social_id: "4242".to_string(),
                nickname: Some("Kakao Friend".to_string()),
                profile_image_url: None,
            })
        } else {
            Err(AuthError::ProviderRejected("invalid access token".to_string()))
        };
        Box::pin(async move { result })
    }
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

pub fn test_config() -> MoaConfig {
    let mut config = MoaConfig::default();
    config.jwt.secret_key = "integration-test-secret".to_string();
    config.password.bcrypt_cost = 4;
    config.share.base_url = "https://moa.test/share".to_string();
    config
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(
            test_config(),
            Arc::new(MemoryStore::new()),
            Arc::new(StubKakao),
        )
        .unwrap();
        let router = Server::new(state.clone()).app();
        Self { state, router }
    }

    /// Send a request and return the status with the JSON body (`Null` when empty).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    pub async fn register(&self, login_id: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "userId": login_id,
                    "password": PASSWORD,
                    "userName": "Test User",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    /// Register and log in; returns the token response.
    pub async fn sign_up(&self, login_id: &str) -> Value {
        self.register(login_id).await;
        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "userId": login_id, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }

    /// Register, log in, and return the access token.
    pub async fn access_token(&self, login_id: &str) -> String {
        self.sign_up(login_id).await["accessToken"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn card(&self, qr_code: &str, is_active: bool) -> Card {
        self.state
            .cards
            .create(NewCard {
                qr_code: qr_code.to_string(),
                title: format!("Card {qr_code}"),
                description: None,
                activity_type: "quiz".to_string(),
                activity_data: json!({ "questions": 3 }),
                thumbnail_url: None,
                is_active,
            })
            .await
            .unwrap()
    }
}
