//! # bffcli
//!
//! Backend-for-frontend gateway for the data platform command line client.
//! It resolves the caller from a bearer token, decides project and zone
//! permissions against the graph service, validates manifests and zone
//! moves, and forwards the remaining work to the platform services.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bffcli::config::AppConfig;
//! use bffcli::server::{AppState, create_router};
//! use bffcli::store::{SqliteStore, Store};
//!
//! let config = AppConfig::load("bffcli.toml".as_ref())?;
//! let store = SqliteStore::new(config.server.db_path())?;
//! store.initialize()?;
//!
//! let state = Arc::new(AppState::from_config(Arc::new(store), &config)?);
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `bffcli` binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod policy;
pub mod server;
pub mod services;
pub mod store;
pub mod types;
