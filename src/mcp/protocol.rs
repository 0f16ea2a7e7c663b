//! MCP Protocol Types
//!
//! JSON-RPC 2.0 envelope and the MCP message shapes the gateway speaks
//! (protocol version 2024-11-05).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mcp::error::McpError;

/// MCP protocol version advertised by `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// The only JSON-RPC version accepted
pub const JSONRPC_VERSION: &str = "2.0";

/// Method names understood by the dispatcher
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const PING: &str = "ping";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
}

/// MCP error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// JSON-RPC request id. Only integers and strings are valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum JsonRpcId {
    Number(i64),
    String(String),
}

impl JsonRpcId {
    /// Placeholder used when a malformed payload carries no usable id
    pub const PLACEHOLDER: JsonRpcId = JsonRpcId::Number(0);

    /// Best-effort id recovery from an arbitrary JSON value
    pub fn recover(value: &Value) -> Self {
        match value.get("id") {
            Some(Value::Number(n)) => n.as_i64().map(JsonRpcId::Number),
            Some(Value::String(s)) => Some(JsonRpcId::String(s.clone())),
            _ => None,
        }
        .unwrap_or(Self::PLACEHOLDER)
    }
}

impl fmt::Display for JsonRpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonRpcId::Number(n) => write!(f, "{}", n),
            JsonRpcId::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for JsonRpcId {
    fn from(value: i64) -> Self {
        JsonRpcId::Number(value)
    }
}

impl From<&str> for JsonRpcId {
    fn from(value: &str) -> Self {
        JsonRpcId::String(value.to_string())
    }
}

impl From<String> for JsonRpcId {
    fn from(value: String) -> Self {
        JsonRpcId::String(value)
    }
}

/// JSON-RPC 2.0 Request
///
/// A request without an `id` (or with `id: null`) is a notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    /// Checked by [`JsonRpcRequest::validate`], not during parsing
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

/// A payload that could not be turned into a request at all
#[derive(Debug)]
pub struct RejectedPayload {
    /// Recovered id, or [`JsonRpcId::PLACEHOLDER`]
    pub id: JsonRpcId,
    pub error: McpError,
}

impl RejectedPayload {
    pub fn into_response(self) -> JsonRpcResponse {
        JsonRpcResponse::from_error(self.id, &self.error)
    }
}

impl JsonRpcRequest {
    pub fn new(id: impl Into<JsonRpcId>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id.into()),
            method: method.into(),
            params: params.and_then(|p| match p {
                Value::Object(map) => Some(map),
                _ => None,
            }),
        }
    }

    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self { id: None, ..Self::new(0i64, method, params) }
    }

    /// Parse raw bytes into a request.
    ///
    /// Invalid JSON is a parse error; valid JSON of the wrong shape is an
    /// invalid request. Either way the id is recovered when possible.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RejectedPayload> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| RejectedPayload {
            id: JsonRpcId::PLACEHOLDER,
            error: McpError::ParseError(e.to_string()),
        })?;
        Self::from_value(value)
    }

    /// Interpret an already-parsed JSON value as a request
    pub fn from_value(value: Value) -> Result<Self, RejectedPayload> {
        let id = JsonRpcId::recover(&value);

        match &value {
            Value::Object(_) => {}
            Value::Array(_) => {
                return Err(RejectedPayload {
                    id,
                    error: McpError::InvalidRequest("Batch requests are not supported".to_string()),
                })
            }
            _ => {
                return Err(RejectedPayload {
                    id,
                    error: McpError::InvalidRequest("Request must be a JSON object".to_string()),
                })
            }
        }

        serde_json::from_value(value)
            .map_err(|e| RejectedPayload { id, error: McpError::InvalidRequest(e.to_string()) })
    }

    /// Protocol-version check, performed before method dispatch
    pub fn validate(&self) -> Result<(), McpError> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Err(McpError::InvalidRequest(format!(
                "Invalid JSON-RPC version '{}', expected '{}'",
                self.jsonrpc, JSONRPC_VERSION
            )));
        }
        Ok(())
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 Response
///
/// Exactly one of `result` and `error` is serialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: JsonRpcId,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePayload {
    Result(Value),
    Error(JsonRpcError),
}

impl JsonRpcResponse {
    pub fn success(id: JsonRpcId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            payload: ResponsePayload::Result(result),
        }
    }

    pub fn error(id: JsonRpcId, error: JsonRpcError) -> Self {
        Self { jsonrpc: JSONRPC_VERSION.to_string(), id, payload: ResponsePayload::Error(error) }
    }

    pub fn from_error(id: JsonRpcId, error: &McpError) -> Self {
        Self::error(id, error.to_json_rpc_error())
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            ResponsePayload::Result(value) => Some(value),
            ResponsePayload::Error(_) => None,
        }
    }

    pub fn error_body(&self) -> Option<&JsonRpcError> {
        match &self.payload {
            ResponsePayload::Error(error) => Some(error),
            ResponsePayload::Result(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.payload, ResponsePayload::Error(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Server information provided during initialization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Capabilities advertised by `initialize`: every tool name mapped to its
/// input schema
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerCapabilities {
    pub tools: Map<String, Value>,
}

/// MCP Initialize Result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

/// Tool as listed by `tools/list`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolsListResult {
    pub tools: Vec<Tool>,
}

/// `tools/call` parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

/// `tools/call` result. `content` is passed through from the tool server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Value,
    pub is_error: bool,
}

impl ToolCallResult {
    pub fn success(content: Value) -> Self {
        Self { content, is_error: false }
    }
}
