use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};

use moa_auth::AuthLayer;
use moa_core::{ActivityId, Paginated};

use crate::dto::{ActivityCreate, ActivityResponse, ActivityStatsResponse, PageQuery};
use crate::error::Result;
use crate::extract::{CurrentUser, Json, Path, Query};
use crate::state::AppState;

pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_activity))
        .route("/me", get(my_activities))
        .route("/stats/me", get(my_stats))
        .route("/{id}", get(get_activity))
        .route_layer(AuthLayer::required(state.validator.clone()))
}

async fn create_activity(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<ActivityCreate>,
) -> Result<(StatusCode, Json<ActivityResponse>)> {
    let activity = state.activities.record(user_id, req).await?;
    Ok((StatusCode::CREATED, Json(activity.into())))
}

async fn my_activities(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<ActivityResponse>>> {
    let activities = state.activities.list_mine(user_id, query.page()?).await?;
    Ok(Json(activities.map(ActivityResponse::from)))
}

async fn my_stats(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ActivityStatsResponse>> {
    Ok(Json(state.activities.stats(user_id).await?.into()))
}

async fn get_activity(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<ActivityId>,
) -> Result<Json<ActivityResponse>> {
    Ok(Json(state.activities.get(user_id, id).await?.into()))
}
