//! # MCP Gateway
//!
//! A gateway that speaks the JSON-RPC based Model Context Protocol to a
//! caller and forwards `tools/call` requests to independently hosted tool
//! servers over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! HTTP (axum) → Dispatcher → Tool Registry
//!                   ↓
//!             Remote Tool Proxy → tool servers
//! ```
//!
//! ## Core Components
//!
//! - **Protocol**: JSON-RPC 2.0 envelope parsing and MCP message types
//! - **Registry**: immutable tool set, swapped atomically on reload
//! - **Proxy**: one outbound POST per tool call, no retry
//! - **Dispatcher**: method routing and error mapping
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mcp_gateway::{api::start_gateway_server, config::GatewayConfig, startup::GatewayContext};
//!
//! #[tokio::main]
//! async fn main() -> mcp_gateway::Result<()> {
//!     let config = GatewayConfig::default();
//!     let context = Arc::new(GatewayContext::build(&config, None)?);
//!     start_gateway_server(&config.server.host, config.server.port, context).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod mcp;
pub mod observability;
pub mod startup;

pub use config::GatewayConfig;
pub use errors::{Error, GatewayError, Result};
pub use startup::GatewayContext;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
