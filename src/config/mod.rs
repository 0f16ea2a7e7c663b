//! # Configuration Management
//!
//! The gateway is configured from a YAML file with a handful of environment
//! overrides applied on top. [`load_config`] never fails: a missing or broken
//! file degrades to the defaults (no tools, `0.0.0.0:8000`, `/mcp`) with a
//! warning. [`load_config_strict`] surfaces every problem and backs the
//! `check` subcommand.

use std::path::Path;

use tracing::{debug, warn};

use crate::errors::{GatewayError, Result};

pub mod settings;

pub use settings::{
    GatewayConfig, HttpClientConfig, LoggingConfig, MetricsConfig, ServerConfig,
    ServerInfoConfig, ToolConfig, DEFAULT_RPC_PATH, DEFAULT_TOOL_TIMEOUT_SECONDS, FIXED_ROUTES,
    HEALTH_PATH, PING_PATH, TOOLS_PATH,
};

/// Default configuration file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Environment variable names recognized as overrides
pub mod env_vars {
    pub const HOST: &str = "MCP_GATEWAY_HOST";
    pub const PORT: &str = "MCP_GATEWAY_PORT";
    pub const RPC_PATH: &str = "MCP_GATEWAY_RPC_PATH";
    pub const TIMEOUT_SECONDS: &str = "MCP_GATEWAY_TIMEOUT_SECONDS";
    pub const LOG_LEVEL: &str = "MCP_GATEWAY_LOG_LEVEL";
}

impl GatewayConfig {
    /// Parse a configuration document. An empty document yields the defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Read and parse a configuration file without applying overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::io(e, format!("Failed to read config file '{}'", path.display()))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Apply `MCP_GATEWAY_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup source
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(env_vars::HOST) {
            self.server.host = host;
        }

        if let Some(port) = lookup(env_vars::PORT) {
            self.server.port = port.parse().map_err(|e| {
                GatewayError::config(format!("Invalid {} '{}': {}", env_vars::PORT, port, e))
            })?;
        }

        if let Some(path) = lookup(env_vars::RPC_PATH) {
            self.rpc_path = path;
        }

        if let Some(timeout) = lookup(env_vars::TIMEOUT_SECONDS) {
            self.http.timeout_seconds = timeout.parse().map_err(|e| {
                GatewayError::config(format!(
                    "Invalid {} '{}': {}",
                    env_vars::TIMEOUT_SECONDS,
                    timeout,
                    e
                ))
            })?;
        }

        if let Some(level) = lookup(env_vars::LOG_LEVEL) {
            self.logging.level = level;
        }

        Ok(())
    }
}

/// Load, override and validate the configuration, reporting every failure.
///
/// A missing file is an error here, unlike [`load_config`].
pub fn load_config_strict(path: &Path) -> Result<GatewayConfig> {
    let mut config = GatewayConfig::from_file(path)?;
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration, falling back to defaults when the file cannot be
/// used.
///
/// Individual tool records are not validated here: duplicates and bad
/// endpoints are skipped by the registry while the rest of the file is kept.
/// Environment overrides are still applied to the defaults so a container
/// without a config file can be pointed at a port.
pub fn load_config(path: &Path) -> GatewayConfig {
    let base = if path.exists() {
        match GatewayConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
                GatewayConfig::default()
            }
        }
    } else {
        debug!(path = %path.display(), "Config file not found, using defaults");
        GatewayConfig::default()
    };

    let config = with_env_overrides(base);
    match config.validate_settings() {
        Ok(()) => return config,
        Err(e) => warn!(error = %e, "Invalid configuration, using defaults"),
    }

    let fallback = with_env_overrides(GatewayConfig::default());
    match fallback.validate_settings() {
        Ok(()) => fallback,
        Err(e) => {
            warn!(error = %e, "Environment overrides invalid for defaults, ignoring them");
            GatewayConfig::default()
        }
    }
}

/// Apply environment overrides, keeping `base` untouched if any is invalid
fn with_env_overrides(base: GatewayConfig) -> GatewayConfig {
    let mut config = base.clone();
    match config.apply_env_overrides() {
        Ok(()) => config,
        Err(e) => {
            warn!(error = %e, "Ignoring invalid environment override");
            base
        }
    }
}
