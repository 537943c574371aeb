use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use serde::Deserialize;
use serde_json::json;

use moa_auth::AuthLayer;
use moa_core::{NotificationId, Page};

use crate::dto::{
    NotificationListResponse, NotificationResponse, NotificationStatsResponse,
    NotificationUpdate, SuccessResponse,
};
use crate::error::Result;
use crate::extract::{CurrentUser, Json, Path, Query};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationListQuery {
    unread_only: Option<bool>,
    skip: Option<i64>,
    limit: Option<i64>,
}

pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(my_notifications))
        .route("/stats/me", get(my_stats))
        .route("/read-all", post(mark_all_read))
        .route("/{id}", patch(set_read).delete(delete_notification))
        .route_layer(AuthLayer::required(state.validator.clone()))
}

async fn my_notifications(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<NotificationListResponse>> {
    let page = Page::new(query.skip, query.limit)?;
    let (items, stats) = state
        .notifications
        .list_mine(user_id, query.unread_only.unwrap_or(false), page)
        .await?;
    Ok(Json(NotificationListResponse {
        notifications: items.into_iter().map(Into::into).collect(),
        total: stats.total,
        unread_count: stats.unread,
    }))
}

async fn my_stats(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<NotificationStatsResponse>> {
    Ok(Json(state.notifications.stats(user_id).await?.into()))
}

async fn set_read(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<NotificationId>,
    Json(req): Json<NotificationUpdate>,
) -> Result<Json<NotificationResponse>> {
    let notification = state
        .notifications
        .set_read(user_id, id, req.is_read)
        .await?;
    Ok(Json(notification.into()))
}

async fn mark_all_read(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<SuccessResponse>> {
    let updated = state.notifications.mark_all_read(user_id).await?;
    Ok(Json(
        SuccessResponse::new("All notifications marked as read")
            .with_data(json!({ "updated": updated })),
    ))
}

async fn delete_notification(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<NotificationId>,
) -> Result<StatusCode> {
    state.notifications.delete(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
