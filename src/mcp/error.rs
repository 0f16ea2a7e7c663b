//! MCP Error Types

use crate::mcp::protocol::{error_codes, JsonRpcError};
use crate::mcp::proxy::ProxyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method '{0}' not found")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Tool '{0}' not found")]
    ToolNotFound(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(#[from] ProxyError),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl McpError {
    /// Convert to JSON-RPC error code
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::ParseError(_) => error_codes::PARSE_ERROR,
            McpError::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            McpError::MethodNotFound(_) | McpError::ToolNotFound(_) => {
                error_codes::METHOD_NOT_FOUND
            }
            McpError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            McpError::ToolCallFailed(_)
            | McpError::InternalError(_)
            | McpError::SerializationError(_) => error_codes::INTERNAL_ERROR,
        }
    }

    /// Short label used for the `outcome` metric dimension
    pub fn outcome(&self) -> &'static str {
        match self {
            McpError::ParseError(_) => "parse_error",
            McpError::InvalidRequest(_) => "invalid_request",
            McpError::MethodNotFound(_) => "method_not_found",
            McpError::InvalidParams(_) => "invalid_params",
            McpError::ToolNotFound(_) => "tool_not_found",
            McpError::ToolCallFailed(_) => "tool_error",
            McpError::InternalError(_) | McpError::SerializationError(_) => "internal_error",
        }
    }

    /// Convert to JsonRpcError
    pub fn to_json_rpc_error(&self) -> JsonRpcError {
        JsonRpcError { code: self.error_code(), message: self.to_string(), data: None }
    }
}

impl From<McpError> for JsonRpcError {
    fn from(error: McpError) -> Self {
        error.to_json_rpc_error()
    }
}
