//! # Structured Logging
//!
//! Subscriber setup and span helpers built on the tracing ecosystem.

use tracing_subscriber::EnvFilter;

use crate::config::{GatewayConfig, LoggingConfig};
use crate::errors::{GatewayError, Result};

/// Create a tracing span for one JSON-RPC request.
///
/// The `tool` field starts empty and is recorded once `tools/call` params
/// are parsed.
///
/// ```rust,ignore
/// let span = rpc_span!("tools/call", id);
/// ```
#[macro_export]
macro_rules! rpc_span {
    ($method:expr, $id:expr) => {
        tracing::info_span!(
            "rpc_request",
            method = %$method,
            id = ?$id,
            request_id = %uuid::Uuid::new_v4(),
            tool = tracing::field::Empty
        )
    };
}

/// Build the level filter. `RUST_LOG` wins over the configured level and
/// `verbose` forces debug.
pub fn build_env_filter(config: &LoggingConfig, verbose: bool) -> Result<EnvFilter> {
    if verbose {
        return Ok(EnvFilter::new("debug"));
    }

    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return Ok(EnvFilter::from_default_env());
    }

    EnvFilter::try_new(&config.level).map_err(|e| {
        GatewayError::config(format!("Invalid log level '{}': {}", config.level, e))
    })
}

/// Install the global subscriber
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = build_env_filter(config, verbose)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    installed
        .map_err(|e| GatewayError::internal(format!("Failed to install log subscriber: {}", e)))
}

/// Log configuration at startup
pub fn log_config_info(config: &GatewayConfig) {
    tracing::info!(
        server_address = %config.server.bind_address(),
        rpc_path = %config.rpc_path,
        tool_timeout_seconds = config.http.timeout_seconds,
        configured_tools = config.tools.len(),
        validate_arguments = config.validate_arguments,
        metrics_enabled = config.metrics.enabled,
        "MCP gateway configuration"
    );
}
