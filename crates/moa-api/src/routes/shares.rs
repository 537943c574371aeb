use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde::Deserialize;

use moa_auth::AuthLayer;
use moa_core::{Page, Paginated, ShareId};

use crate::dto::{
    ShareAccessRequest, ShareCreate, ShareResponse, ShareStatsResponse, ShareUpdate,
    ShareWithCardResponse,
};
use crate::error::Result;
use crate::extract::{CurrentUser, Json, Path, Query};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareListQuery {
    is_active: Option<bool>,
    skip: Option<i64>,
    limit: Option<i64>,
}

/// Token routes are public; everything else belongs to the share's owner.
pub(super) fn router(state: &AppState) -> Router<AppState> {
    let owned = Router::new()
        .route("/", post(create_share))
        .route("/me", get(my_shares))
        .route("/stats/me", get(my_stats))
        .route(
            "/{id}",
            get(get_share).patch(update_share).delete(delete_share),
        )
        .route_layer(AuthLayer::required(state.validator.clone()));

    Router::new()
        .route("/token/{token}", get(share_info))
        .route("/token/{token}/access", post(access_share))
        .merge(owned)
}

async fn create_share(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<ShareCreate>,
) -> Result<(StatusCode, Json<ShareResponse>)> {
    let share = state.shares.create(user_id, req).await?;
    let url = state.shares.share_url(&share.share_token);
    Ok((StatusCode::CREATED, Json(ShareResponse::new(share, url))))
}

async fn my_shares(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<ShareListQuery>,
) -> Result<Json<Paginated<ShareResponse>>> {
    let page = Page::new(query.skip, query.limit)?;
    let shares = state
        .shares
        .list_mine(user_id, query.is_active, page)
        .await?;
    Ok(Json(shares.map(|share| {
        let url = state.shares.share_url(&share.share_token);
        ShareResponse::new(share, url)
    })))
}

async fn my_stats(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ShareStatsResponse>> {
    Ok(Json(state.shares.stats(user_id).await?.into()))
}

async fn get_share(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<ShareId>,
) -> Result<Json<ShareResponse>> {
    let share = state.shares.get_owned(user_id, id).await?;
    let url = state.shares.share_url(&share.share_token);
    Ok(Json(ShareResponse::new(share, url)))
}

async fn update_share(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<ShareId>,
    Json(req): Json<ShareUpdate>,
) -> Result<Json<ShareResponse>> {
    let share = state.shares.update(user_id, id, req).await?;
    let url = state.shares.share_url(&share.share_token);
    Ok(Json(ShareResponse::new(share, url)))
}

async fn delete_share(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<ShareId>,
) -> Result<StatusCode> {
    state.shares.delete(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn share_info(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ShareWithCardResponse>> {
    let (share, card) = state.shares.public_info(&token).await?;
    let url = state.shares.share_url(&share.share_token);
    Ok(Json(ShareWithCardResponse::new(share, card, url)))
}

async fn access_share(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ShareAccessRequest>,
) -> Result<Json<ShareWithCardResponse>> {
    let (share, card) = state
        .shares
        .access(&token, req.password.as_deref())
        .await?;
    let url = state.shares.share_url(&share.share_token);
    Ok(Json(ShareWithCardResponse::new(share, card, url)))
}
