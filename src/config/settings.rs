//! # Configuration Settings
//!
//! Defines the configuration structure for the MCP gateway.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use validator::Validate;

use crate::errors::{GatewayError, Result};

/// Default RPC path for the MCP endpoint
pub const DEFAULT_RPC_PATH: &str = "/mcp";

/// Default per-call timeout for outbound tool requests, in seconds
pub const DEFAULT_TOOL_TIMEOUT_SECONDS: u64 = 30;

pub const HEALTH_PATH: &str = "/health";
pub const PING_PATH: &str = "/ping";
pub const TOOLS_PATH: &str = "/tools";

/// GET routes mounted regardless of configuration
pub const FIXED_ROUTES: [&str; 3] = [HEALTH_PATH, PING_PATH, TOOLS_PATH];

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GatewayConfig {
    /// Path the JSON-RPC endpoint is mounted on
    #[validate(length(min = 1, message = "RPC path cannot be empty"))]
    pub rpc_path: String,

    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Outbound HTTP client configuration
    #[validate(nested)]
    pub http: HttpClientConfig,

    /// Identity reported by `initialize`
    #[validate(nested)]
    pub server_info: ServerInfoConfig,

    /// Validate `tools/call` arguments against the tool's input schema
    /// before forwarding them
    pub validate_arguments: bool,

    /// Logging configuration
    #[validate(nested)]
    pub logging: LoggingConfig,

    /// Metrics configuration
    #[validate(nested)]
    pub metrics: MetricsConfig,

    /// Remote tools served by the gateway
    #[validate(nested)]
    pub tools: Vec<ToolConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            rpc_path: DEFAULT_RPC_PATH.to_string(),
            server: ServerConfig::default(),
            http: HttpClientConfig::default(),
            server_info: ServerInfoConfig::default(),
            validate_arguments: false,
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
            tools: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Validate the entire configuration, tool records included
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(GatewayError::from)?;
        self.validate_routes()?;
        self.validate_tools()
    }

    /// Validate everything except the individual tool records.
    ///
    /// Bad tool records are left for the registry to skip.
    pub fn validate_settings(&self) -> Result<()> {
        let settings = Self { tools: Vec::new(), ..self.clone() };
        Validate::validate(&settings).map_err(GatewayError::from)?;
        settings.validate_routes()
    }

    /// Paths the router mounts must be absolute and distinct
    fn validate_routes(&self) -> Result<()> {
        if !self.rpc_path.starts_with('/') {
            return Err(GatewayError::validation_field(
                format!("RPC path '{}' must start with '/'", self.rpc_path),
                "rpc_path",
            ));
        }

        if !self.metrics.enabled {
            return Ok(());
        }

        let path = self.metrics.path.as_str();
        if !path.starts_with('/') {
            return Err(GatewayError::validation_field(
                format!("Metrics path '{}' must start with '/'", path),
                "metrics.path",
            ));
        }

        if path == self.rpc_path {
            return Err(GatewayError::validation_field(
                "Metrics path cannot be the same as the RPC path",
                "metrics.path",
            ));
        }

        if FIXED_ROUTES.contains(&path) {
            return Err(GatewayError::validation_field(
                format!("Metrics path '{}' is already served by the gateway", path),
                "metrics.path",
            ));
        }

        Ok(())
    }

    fn validate_tools(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for tool in &self.tools {
            if !seen.insert(tool.name.as_str()) {
                return Err(GatewayError::validation_field(
                    format!("Duplicate tool name '{}'", tool.name),
                    "tools",
                ));
            }
            if !tool.input_schema.is_object() {
                return Err(GatewayError::validation_field(
                    format!("Tool '{}' input_schema must be a mapping", tool.name),
                    "tools.input_schema",
                ));
            }
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Maximum request body size in bytes
    #[validate(range(min = 1024, message = "Max body size must be at least 1KB"))]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8000, max_body_size: 1024 * 1024 }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Outbound HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Per-call timeout for tool requests in seconds
    #[serde(alias = "timeout")]
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self { timeout_seconds: DEFAULT_TOOL_TIMEOUT_SECONDS }
    }
}

impl HttpClientConfig {
    /// Get the per-call timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Server identity advertised in the `initialize` result
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerInfoConfig {
    #[validate(length(min = 1, message = "Server name cannot be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "Server version cannot be empty"))]
    pub version: String,
}

impl Default for ServerInfoConfig {
    fn default() -> Self {
        Self { name: "mcp-gateway".to_string(), version: crate::VERSION.to_string() }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub level: String,

    /// Enable JSON structured logging
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and expose the scrape endpoint
    pub enabled: bool,

    /// Path the scrape endpoint is mounted on
    #[validate(length(min = 1, message = "Metrics path cannot be empty"))]
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: false, path: "/metrics".to_string() }
    }
}

/// A single remote tool record
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ToolConfig {
    /// Unique tool name
    #[validate(length(min = 1, max = 128, message = "Tool name must be 1-128 characters"))]
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// URL the gateway POSTs tool calls to
    #[validate(url(message = "Tool endpoint must be a valid URL"))]
    pub endpoint: String,

    /// JSON Schema describing the tool's arguments
    #[serde(default = "default_input_schema")]
    pub input_schema: serde_json::Value,
}

fn default_input_schema() -> serde_json::Value {
    serde_json::json!({"type": "object"})
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn weather_tool() -> ToolConfig {
        ToolConfig {
            name: "get_current_weather".to_string(),
            description: "Get current weather for a location".to_string(),
            endpoint: "http://localhost:9001/v1/get_current_weather".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"location": {"type": "string"}},
                "required": ["location"]
            }),
        }
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.rpc_path, "/mcp");
        assert_eq!(config.server.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.http.timeout(), Duration::from_secs(30));
        assert!(config.tools.is_empty());
        assert!(!config.validate_arguments);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_valid_config_with_tools() {
        let config = GatewayConfig { tools: vec![weather_tool()], ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_tool_endpoint() {
        let mut tool = weather_tool();
        tool.endpoint = "not a url".to_string();
        let config = GatewayConfig { tools: vec![tool], ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_tool_names_rejected() {
        let config =
            GatewayConfig { tools: vec![weather_tool(), weather_tool()], ..Default::default() };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate tool name 'get_current_weather'"));
    }

    #[test]
    fn test_rpc_path_must_be_absolute() {
        let config = GatewayConfig { rpc_path: "mcp".to_string(), ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_metrics_path_rejected_when_relative() {
        let mut config = GatewayConfig::default();
        config.metrics.enabled = true;
        config.metrics.path = "metrics".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
        assert!(config.validate_settings().is_err());
    }

    #[test]
    fn test_metrics_path_rejected_on_fixed_routes() {
        for path in FIXED_ROUTES {
            let mut config = GatewayConfig::default();
            config.metrics.enabled = true;
            config.metrics.path = path.to_string();

            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("already served"), "{} accepted", path);
        }
    }

    #[test]
    fn test_metrics_path_rejected_on_rpc_path() {
        let mut config = GatewayConfig::default();
        config.metrics.enabled = true;
        config.metrics.path = "/mcp".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_metrics_path_unchecked_when_disabled() {
        let mut config = GatewayConfig::default();
        config.metrics.path = "/health".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_settings_validation_ignores_tool_records() {
        let mut bad_endpoint = weather_tool();
        bad_endpoint.name = "broken".to_string();
        bad_endpoint.endpoint = "not a url".to_string();
        let config = GatewayConfig {
            tools: vec![weather_tool(), weather_tool(), bad_endpoint],
            ..Default::default()
        };

        assert!(config.validate().is_err());
        assert!(config.validate_settings().is_ok());
    }

    #[test]
    fn test_timeout_range() {
        let config = GatewayConfig {
            http: HttpClientConfig { timeout_seconds: 0 },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_alias_deserializes() {
        let config: GatewayConfig = serde_yaml::from_str("http:\n  timeout: 5\n").unwrap();
        assert_eq!(config.http.timeout_seconds, 5);
    }

    #[test]
    fn test_missing_input_schema_defaults_to_object() {
        let yaml = r#"
tools:
  - name: echo
    endpoint: http://localhost:9100/echo
"#;
        let config: GatewayConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tools[0].input_schema, json!({"type": "object"}));
        assert_eq!(config.tools[0].description, "");
    }
}
