//! # HTTP API
//!
//! Axum surface of the gateway: the JSON-RPC endpoint, health checks,
//! registry inspection and the metrics scrape endpoint.

pub mod handlers;
pub mod routes;
pub mod server;

pub use routes::{build_router, ApiState};
pub use server::start_gateway_server;
