use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};

use moa_auth::AuthLayer;

use crate::dto::{PasswordChange, SuccessResponse, UserProfileResponse, UserResponse, UserUpdate};
use crate::error::Result;
use crate::extract::{CurrentUser, Json};
use crate::state::AppState;

pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(me).patch(update_me).delete(withdraw))
        .route("/me/profile", get(profile))
        .route("/me/password", post(change_password))
        .route_layer(AuthLayer::required(state.validator.clone()))
}

async fn me(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserResponse>> {
    Ok(Json(state.users.get(user_id).await?.into()))
}

async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<UserUpdate>,
) -> Result<Json<UserResponse>> {
    Ok(Json(state.users.update(user_id, req).await?.into()))
}

async fn profile(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserProfileResponse>> {
    let profile = state.users.profile(user_id).await?;
    Ok(Json(UserProfileResponse {
        user: profile.user.into(),
        total_activities: profile.total_activities,
        total_shares: profile.total_shares,
    }))
}

async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<PasswordChange>,
) -> Result<Json<SuccessResponse>> {
    state.users.change_password(user_id, req).await?;
    Ok(Json(SuccessResponse::new(
        "Password changed. Please sign in again.",
    )))
}

async fn withdraw(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<SuccessResponse>> {
    state.users.withdraw(user_id).await?;
    Ok(Json(SuccessResponse::new("Account deactivated")))
}
