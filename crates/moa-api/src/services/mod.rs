//! Business rules behind the HTTP routes.
//!
//! Services work on domain types from `moa-core` and talk to storage through
//! [`Store`](moa_storage::Store). Routes only translate HTTP to service calls
//! and back. The card and notification services are also driven by the admin
//! CLI.

mod activities;
mod auth;
mod cards;
mod notifications;
mod shares;
mod users;

pub use activities::ActivityService;
pub use auth::{AuthService, ClientInfo};
pub use cards::CardService;
pub use notifications::NotificationService;
pub use shares::ShareService;
pub use users::{UserProfile, UserService};

use moa_core::UserId;
use moa_storage::{Store, UserStore};

use crate::error::{ApiError, Result};

/// Load a user that a valid token already vouched for.
pub(crate) async fn load_user(store: &dyn Store, user_id: UserId) -> Result<moa_core::model::User> {
    store
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// `Forbidden` unless `owner` is `caller`.
pub(crate) fn ensure_owner(owner: UserId, caller: UserId, what: &str) -> Result<()> {
    if owner != caller {
        return Err(ApiError::forbidden(format!(
            "You do not have access to this {what}"
        )));
    }
    Ok(())
}
