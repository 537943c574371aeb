//! PostgreSQL storage backend.
//!
//! Queries are checked at runtime (`query_as` + [`FromRow`](sqlx::FromRow)
//! rows), so building the crate never needs a live database. The schema lives
//! in `migrations/` and is embedded into the binary.

mod activities;
mod cards;
mod notifications;
mod rows;
mod shares;
mod tokens;
mod users;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::{Error, Result};

/// Migrations embedded at compile time.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Storage backend over a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a pool against `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        tracing::info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply any pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

/// Unique index name to the entity and field it protects.
const UNIQUE_INDEXES: &[(&str, &str, &str)] = &[
    ("ux_users_login_id", "user", "login id"),
    ("ux_users_social", "user", "social account"),
    ("ux_cards_qr_code", "card", "QR code"),
    ("ux_shares_share_token", "share", "token"),
    ("ux_refresh_tokens_token_hash", "refresh token", "token"),
];

/// Translate constraint violations on insert into storage errors.
///
/// A foreign-key failure means the referenced user or card is missing.
pub(crate) fn map_write_error(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default();
        if db_err.is_unique_violation() {
            if let Some((_, entity, field)) =
                UNIQUE_INDEXES.iter().find(|(name, _, _)| *name == constraint)
            {
                return Error::duplicate(entity, field);
            }
            return Error::duplicate("record", "key");
        }
        if db_err.is_foreign_key_violation() {
            let missing = if constraint.contains("card_id") {
                "card"
            } else {
                "user"
            };
            return Error::not_found(missing, "referenced id");
        }
    }
    Error::Database(err)
}

/// `NotFound` when an UPDATE/DELETE touched no row.
pub(crate) fn expect_affected(
    affected: u64,
    entity: &'static str,
    id: impl ToString,
) -> Result<()> {
    if affected == 0 {
        return Err(Error::not_found(entity, id));
    }
    Ok(())
}
