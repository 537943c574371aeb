//! # moa-api
//!
//! HTTP API server for the MOA activity archive.
//!
//! This crate provides:
//! - The axum [`Router`](axum::Router) behind `/api` and its handlers
//! - Services holding the business rules, shared with the admin CLI
//! - Request/response bodies ([`dto`]) and JSON error rendering ([`ApiError`])
//! - [`StoreTokenValidator`], which plugs the user store into `moa-auth`'s middleware

#![forbid(unsafe_code)]

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
pub mod validator;

pub use error::{ApiError, ErrorResponse, Result};
pub use server::Server;
pub use state::AppState;
pub use validator::StoreTokenValidator;
