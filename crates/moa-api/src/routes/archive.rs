//! The user's archive: cards they completed and what they did recently.

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::Deserialize;

use moa_auth::AuthLayer;
use moa_core::{CardId, Page};

use crate::dto::{
    ActivityResponse, ActivityWithCardResponse, CompletedCardResponse, PageQuery,
};
use crate::error::Result;
use crate::extract::{CurrentUser, Json, Path, Query};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletedCardsQuery {
    activity_type: Option<String>,
    skip: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RecentQuery {
    days: Option<i64>,
    limit: Option<i64>,
}

pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/cards", get(completed_cards))
        .route("/recent", get(recent))
        .route("/cards/{id}/activities", get(card_activities))
        .route_layer(AuthLayer::required(state.validator.clone()))
}

async fn completed_cards(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<CompletedCardsQuery>,
) -> Result<Json<Vec<CompletedCardResponse>>> {
    let page = Page::new(query.skip, query.limit)?;
    let cards = state
        .activities
        .completed_cards(user_id, query.activity_type.as_deref(), page)
        .await?;
    Ok(Json(cards.into_iter().map(Into::into).collect()))
}

async fn recent(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<ActivityWithCardResponse>>> {
    let activities = state
        .activities
        .recent(user_id, query.days, query.limit)
        .await?;
    Ok(Json(activities.into_iter().map(Into::into).collect()))
}

async fn card_activities(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(card_id): Path<CardId>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<ActivityResponse>>> {
    let activities = state
        .activities
        .card_activities(user_id, card_id, query.page()?)
        .await?;
    Ok(Json(activities.into_iter().map(Into::into).collect()))
}
