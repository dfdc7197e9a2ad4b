//! # Innkeep
//!
//! Innkeep is a multi-tenant property management backend. It exposes a REST
//! API for organizations, their members and invitations, and the properties
//! and reservations each organization manages, authenticated with cookie
//! sessions pinned to one organization at a time.
//!
//! ## Request pipeline
//!
//! Every request passes up to three gates before a handler runs:
//!
//! ```text
//! HTTP request → session gate → membership gate → role gate → handler
//!                     ↓               ↓               ↓
//!               SessionIdentity   OrgContext     minimum Role
//! ```
//!
//! ## Layout
//!
//! - [`api`]: axum server, routes, handlers, and the response envelope
//! - [`auth`]: cookie sessions, invitations, and the gate pipeline
//! - [`storage`]: SQLx on SQLite behind repository traits
//!
//! ## Starting the server
//!
//! ```rust,no_run
//! use innkeep::api::{start_api_server, ApiState};
//! use innkeep::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> innkeep::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let pool = innkeep::storage::create_pool(&config.database).await?;
//!     let state = ApiState::with_sqlx(pool, config.auth.clone());
//!     start_api_server(config.server, state).await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod storage;

pub use config::{AppConfig, Environment};
pub use errors::{InnkeepError, Result};
pub use observability::init_tracing;

/// Version the binaries report, from the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name used in logs and the OpenAPI document.
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
