//! Handlers for the server, database, and administration subcommands.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use moa_api::dto::{CardDetailResponse, CardListResponse, CardResponse, NotificationResponse};
use moa_api::services::{CardService, NotificationService};
use moa_api::{AppState, Server};
use moa_auth::KakaoProfileProvider;
use moa_core::model::{CardChanges, CardFilter, NewCard, NewNotification};
use moa_core::{MoaConfig, Page, Validate};
use moa_storage::{MemoryStore, PgStore, RefreshTokenStore, Store, UserStore};

use crate::cli::{CardAction, CardUpdateArgs, NotifyArgs, TokenAction};

pub async fn serve(
    mut config: MoaConfig,
    host: Option<String>,
    port: Option<u16>,
    memory: bool,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let store: Arc<dyn Store> = if memory {
        tracing::warn!("Using the in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(connect(&config).await?)
    };
    let social = Arc::new(KakaoProfileProvider::new(
        config.social.kakao_userinfo_url.clone(),
    ));

    tracing::info!(
        environment = %config.environment,
        project = %config.project_name,
        "Starting MOA API"
    );
    let state = AppState::new(config, store, social).context("invalid JWT settings")?;
    Server::new(state).serve(addr).await?;
    Ok(())
}

pub async fn migrate(config: &MoaConfig) -> Result<()> {
    let store = connect(config).await?;
    store.migrate().await.context("migration failed")?;
    println!("Migrations applied");
    Ok(())
}

pub async fn card(config: &MoaConfig, action: CardAction) -> Result<()> {
    let cards = CardService::new(Arc::new(connect(config).await?));

    match action {
        CardAction::Create {
            qr_code,
            title,
            description,
            activity_type,
            activity_data,
            thumbnail_url,
            inactive,
        } => {
            let card = cards
                .create(NewCard {
                    qr_code,
                    title,
                    description,
                    activity_type,
                    activity_data: parse_json_object("activity-data", &activity_data)?,
                    thumbnail_url,
                    is_active: !inactive,
                })
                .await?;
            print_json(&CardResponse::from(card))
        }
        CardAction::List {
            activity_type,
            active,
            skip,
            limit,
        } => {
            let filter = CardFilter {
                activity_type,
                is_active: active,
            };
            let page = Page::new(skip, limit)?;
            let listing = cards.list(&filter, page).await?;
            print_json(&listing.map(CardListResponse::from))
        }
        CardAction::Show { id } => {
            let (card, totals) = cards.get_detail(id).await?;
            print_json(&CardDetailResponse::new(card, totals))
        }
        CardAction::Update { id, changes } => {
            let card = cards.update(id, card_changes(changes)?).await?;
            print_json(&CardResponse::from(card))
        }
        CardAction::Deactivate { id } => {
            cards.deactivate(id).await?;
            println!("Card {id} deactivated");
            Ok(())
        }
        CardAction::Delete { id } => {
            cards.delete(id).await?;
            println!("Card {id} deleted");
            Ok(())
        }
    }
}

pub async fn notify(config: &MoaConfig, args: NotifyArgs) -> Result<()> {
    let store: Arc<dyn Store> = Arc::new(connect(config).await?);
    let login_id = args.user.trim().to_lowercase();
    let user = store
        .get_user_by_login_id(&login_id)
        .await?
        .with_context(|| format!("no user with login id '{login_id}'"))?;

    let notification = NotificationService::new(store)
        .notify(NewNotification {
            user_id: user.id,
            kind: args.kind,
            title: args.title,
            message: args.message,
            link_url: args.link,
        })
        .await?;
    print_json(&NotificationResponse::from(notification))
}

pub async fn tokens(config: &MoaConfig, action: TokenAction) -> Result<()> {
    match action {
        TokenAction::Cleanup => {
            let store = connect(config).await?;
            let deleted = store.delete_expired_refresh_tokens(Utc::now()).await?;
            println!("Deleted {deleted} expired refresh tokens");
            Ok(())
        }
    }
}

async fn connect(config: &MoaConfig) -> Result<PgStore> {
    PgStore::connect(&config.database.url, config.database.max_connections)
        .await
        .context("could not connect to the database")
}

fn card_changes(args: CardUpdateArgs) -> Result<CardChanges> {
    Ok(CardChanges {
        title: args.title,
        description: args.description,
        activity_type: args.activity_type,
        activity_data: args
            .activity_data
            .map(|raw| parse_json_object("activity-data", &raw))
            .transpose()?,
        thumbnail_url: args.thumbnail_url,
        is_active: args.active,
    })
}

fn parse_json_object(flag: &str, raw: &str) -> Result<Value> {
    let value: Value =
        serde_json::from_str(raw).with_context(|| format!("--{flag} is not valid JSON"))?;
    if !value.is_object() {
        bail!("--{flag} must be a JSON object");
    }
    Ok(value)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_object() {
        let value = parse_json_object("activity-data", r#"{"questions": 3}"#).unwrap();
        assert_eq!(value["questions"], 3);
        assert!(parse_json_object("activity-data", "[1, 2]").is_err());
        assert!(parse_json_object("activity-data", "{not json").is_err());
    }

    #[test]
    fn test_card_changes_keeps_unset_fields_empty() {
        let changes = card_changes(CardUpdateArgs::default()).unwrap();
        assert!(changes.is_empty());

        let changes = card_changes(CardUpdateArgs {
            activity_data: Some(r#"{"steps": 2}"#.to_string()),
            active: Some(true),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(changes.activity_data.unwrap()["steps"], 2);
        assert_eq!(changes.is_active, Some(true));
    }

    #[tokio::test]
    async fn test_serve_refuses_empty_jwt_secret() {
        let mut config = MoaConfig::default();
        config.jwt.secret_key = "   ".to_string();
        let err = serve(config, None, Some(0), true).await.unwrap_err();
        assert!(format!("{err:#}").contains("secret_key"));
    }

    #[tokio::test]
    async fn test_serve_refuses_out_of_range_settings() {
        let mut config = MoaConfig::default();
        config.jwt.secret_key = "test-secret".to_string();
        config.jwt.refresh_token_expire_days = 100_000_000;
        let err = serve(config, None, Some(0), true).await.unwrap_err();
        assert!(format!("{err:#}").contains("refresh_token_expire_days"));

        let mut config = MoaConfig::default();
        config.jwt.secret_key = "test-secret".to_string();
        config.share.token_length = 0;
        let err = serve(config, None, Some(0), true).await.unwrap_err();
        assert!(format!("{err:#}").contains("token_length"));
    }
}
