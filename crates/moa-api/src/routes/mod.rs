//! HTTP routes.
//!
//! Each module owns one path prefix under `/api` and wraps its handlers in the
//! auth layer they need: none, [`AuthLayer::optional`](moa_auth::AuthLayer::optional)
//! or [`AuthLayer::required`](moa_auth::AuthLayer::required).

mod activities;
mod archive;
mod auth;
mod cards;
mod health;
mod notifications;
mod shares;
mod users;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

/// Every route of the API, with state applied.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth::router(&state))
        .nest("/users", users::router(&state))
        .nest("/cards", cards::router(&state))
        .nest("/activities", activities::router(&state))
        .nest("/archive", archive::router(&state))
        .nest("/shares", shares::router(&state))
        .nest("/notifications", notifications::router(&state));

    Router::new()
        .route("/", get(health::health))
        .nest("/api", api)
        .with_state(state)
}
