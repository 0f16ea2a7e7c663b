//! # Error Types
//!
//! Error types for the MCP gateway process using `thiserror`.
//!
//! Protocol-level failures that are reported back to a caller inside a
//! JSON-RPC envelope live in [`crate::mcp::McpError`]; this type covers the
//! process itself (configuration, binding, I/O).

/// Custom result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway process
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Network transport errors (bind, serve, outbound client construction)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// Internal errors
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl GatewayError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io { source, context: context.into() }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), source: None }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}

impl From<serde_yaml::Error> for GatewayError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::config_with_source("Failed to parse YAML configuration", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for GatewayError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect();

        // Nested structs and lists report through errors(), not field_errors()
        for (field, kind) in errors.errors() {
            match kind {
                validator::ValidationErrorsKind::Struct(_)
                | validator::ValidationErrorsKind::List(_) => {
                    messages.push(format!("{}: invalid nested value", field));
                }
                validator::ValidationErrorsKind::Field(_) => {}
            }
        }

        Self::validation(format!("Validation failed: {}", messages.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = GatewayError::config("Test configuration error");
        assert!(matches!(error, GatewayError::Config { .. }));
        assert_eq!(error.to_string(), "Configuration error: Test configuration error");
    }

    #[test]
    fn test_validation_error() {
        let error = GatewayError::validation_field("Port out of range", "server.port");
        if let GatewayError::Validation { field, .. } = error {
            assert_eq!(field, Some("server.port".to_string()));
        } else {
            panic!("Expected Validation error");
        }
    }

    #[test]
    fn test_transport_error_display() {
        let error = GatewayError::transport("Failed to bind");
        assert_eq!(error.to_string(), "Transport error: Failed to bind");
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let gateway_error: GatewayError = io_error.into();
        assert!(matches!(gateway_error, GatewayError::Io { .. }));

        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let gateway_error: GatewayError = json_error.into();
        assert!(matches!(gateway_error, GatewayError::Serialization { .. }));

        let yaml_error = serde_yaml::from_str::<serde_json::Value>("key: [unclosed").unwrap_err();
        let gateway_error: GatewayError = yaml_error.into();
        assert!(matches!(gateway_error, GatewayError::Config { source: Some(_), .. }));
    }
}
