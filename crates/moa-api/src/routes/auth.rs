use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use serde_json::json;

use moa_auth::AuthLayer;

use crate::dto::{
    LogoutRequest, RefreshRequest, SocialLoginRequest, SuccessResponse, TokenResponse,
    UserCreate, UserLogin, UserResponse,
};
use crate::error::Result;
use crate::extract::{CurrentUser, Json};
use crate::services::ClientInfo;
use crate::state::AppState;

pub(super) fn router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout-all", post(logout_all))
        .route_layer(AuthLayer::required(state.validator.clone()));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/social", post(social_login))
        .merge(protected)
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let user = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(req): Json<UserLogin>,
) -> Result<Json<TokenResponse>> {
    Ok(Json(state.auth.login(req, client).await?))
}

async fn refresh(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>> {
    Ok(Json(state.auth.refresh(&req.refresh_token, client).await?))
}

async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<SuccessResponse>> {
    let revoked = state.auth.logout(req.refresh_token.as_deref()).await?;
    Ok(Json(
        SuccessResponse::new("Logged out").with_data(json!({ "revoked": revoked })),
    ))
}

async fn logout_all(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<SuccessResponse>> {
    let revoked = state.auth.logout_all(user_id).await?;
    Ok(Json(
        SuccessResponse::new("Logged out from all devices")
            .with_data(json!({ "revoked": revoked })),
    ))
}

async fn social_login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(req): Json<SocialLoginRequest>,
) -> Result<Json<TokenResponse>> {
    Ok(Json(state.auth.social_login(req, client).await?))
}
