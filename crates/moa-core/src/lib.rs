#![forbid(unsafe_code)]

//! MOA Core: shared types, errors, validation, and configuration.
//!
//! This crate has no internal MOA dependencies. Every other crate in the
//! workspace builds on the types defined here.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`ids`]: UUID-backed identifier newtypes
//! - [`model`]: Domain entities, insert records, and patch records
//! - [`pagination`]: Skip/limit windows and paginated envelopes
//! - [`validation`]: Input rules shared by the API and the admin CLI
//! - [`config`]: Application configuration and the [`ConfigManager`] trait

pub mod config;
pub mod error;
pub mod ids;
pub mod model;
pub mod pagination;
pub mod validation;

pub use config::{ConfigManager, MoaConfig};
pub use error::{Error, Result};
pub use ids::{ActivityId, CardId, NotificationId, RefreshTokenId, ShareId, UserId};
pub use pagination::{Page, Paginated};
pub use validation::Validate;
