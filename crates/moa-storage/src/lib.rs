//! # moa-storage
//!
//! Persistence for the MOA activity archive.
//!
//! - [`traits`]: one async trait per record family, plus the blanket [`Store`]
//! - [`memory`]: in-memory backend for tests and local development
//! - [`database`]: PostgreSQL backend with embedded migrations

#![forbid(unsafe_code)]

pub mod database;
pub mod error;
pub mod memory;
pub mod traits;

pub use database::PgStore;
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use traits::{
    ActivityStore, CardStore, NotificationStore, RefreshTokenStore, ShareStore, Store, UserStore,
};
