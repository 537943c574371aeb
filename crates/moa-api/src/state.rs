//! Shared application state handed to every handler.

use std::sync::Arc;

use moa_auth::{JwtCodec, PasswordHasher, SocialProfileProvider};
use moa_core::MoaConfig;
use moa_storage::Store;

use crate::services::{
    ActivityService, AuthService, CardService, NotificationService, ShareService, UserService,
};
use crate::validator::StoreTokenValidator;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MoaConfig>,
    pub auth: AuthService,
    pub users: UserService,
    pub cards: CardService,
    pub activities: ActivityService,
    pub shares: ShareService,
    pub notifications: NotificationService,
    pub validator: Arc<StoreTokenValidator>,
}

impl AppState {
    /// Wire the services over one store.
    ///
    /// Fails when the JWT settings are unusable (empty secret, unknown algorithm).
    pub fn new(
        config: MoaConfig,
        store: Arc<dyn Store>,
        social: Arc<dyn SocialProfileProvider>,
    ) -> moa_auth::Result<Self> {
        let jwt = Arc::new(JwtCodec::from_config(&config.jwt)?);
        let passwords = PasswordHasher::new(config.password.bcrypt_cost);

        Ok(Self {
            auth: AuthService::new(store.clone(), jwt.clone(), passwords, social),
            users: UserService::new(store.clone(), passwords),
            cards: CardService::new(store.clone()),
            activities: ActivityService::new(store.clone()),
            shares: ShareService::new(store.clone(), passwords, config.share.clone()),
            notifications: NotificationService::new(store.clone()),
            validator: Arc::new(StoreTokenValidator::new(jwt, store)),
            config: Arc::new(config),
        })
    }
}
