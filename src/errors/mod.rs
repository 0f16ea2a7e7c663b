//! # Error Handling
//!
//! Process-level error types for the MCP gateway.

pub mod types;

pub use types::{GatewayError, Result};

/// Shorthand used by `main` and the public API
pub type Error = GatewayError;
