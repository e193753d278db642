//! # gwctl
//!
//! Client-side model, validator and sync engine for a gateway's
//! configuration: port bindings, listeners, routes, backends, RBAC rule
//! sets and MCP/A2A targets.
//!
//! ## Architecture
//!
//! ```text
//! CLI → ConfigStore → GatewayApi (reqwest) → gateway admin API
//!            ↓
//!   aggregation / classification / validation (derived on read)
//! ```
//!
//! ## Core Components
//!
//! - **Domain**: serde types for the configuration tree
//! - **Client**: the [`client::GatewayApi`] trait and its HTTP implementation
//! - **Services**: pure classification and aggregation over the tree
//! - **Validation**: structural rules and edit payload checks
//! - **Store**: [`store::ConfigStore`], the stateful sync engine with
//!   optimistic mutations
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gwctl::{client::GatewayClient, config::ClientSettings, store::ConfigStore, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = GatewayClient::from_settings(&ClientSettings::from_env())?;
//!     let store = ConfigStore::connect(Arc::new(client)).await;
//!     println!("{:?}", store.backend_stats());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod services;
pub mod store;
pub mod validation;

pub use errors::{GwctlError, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
