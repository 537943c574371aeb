use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use serde::Deserialize;

use moa_auth::AuthLayer;
use moa_core::{CardId, Page, Paginated};

use crate::dto::{CardListResponse, CardResponse};
use crate::error::Result;
use crate::extract::{Json, OptionalUser, Path, Query};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardListQuery {
    activity_type: Option<String>,
    skip: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScanQuery {
    qr_code: String,
}

/// Card browsing works anonymously; a token, when present, is still checked.
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_cards))
        .route("/scan", post(scan))
        .route("/{id}", get(get_card))
        .route_layer(AuthLayer::optional(state.validator.clone()))
}

async fn list_cards(
    State(state): State<AppState>,
    Query(query): Query<CardListQuery>,
) -> Result<Json<Paginated<CardListResponse>>> {
    let page = Page::new(query.skip, query.limit)?;
    let cards = state.cards.list_active(query.activity_type, page).await?;
    Ok(Json(cards.map(CardListResponse::from)))
}

async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<CardId>,
) -> Result<Json<CardResponse>> {
    Ok(Json(state.cards.get_active(id).await?.into()))
}

async fn scan(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<ScanQuery>,
) -> Result<Json<CardResponse>> {
    let card = state.cards.scan(&query.qr_code).await?;
    if let Some(user_id) = user {
        tracing::debug!(user_id = %user_id, card_id = %card.id, "Signed-in scan");
    }
    Ok(Json(card.into()))
}
