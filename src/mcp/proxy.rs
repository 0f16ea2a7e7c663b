//! Remote Tool Proxy
//!
//! Performs the single outbound HTTP POST behind every `tools/call` and maps
//! the tool server's reply onto a result or a [`ProxyError`]. There is no
//! retry; the per-call timeout bounds how long a call may take.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::GatewayError;
use crate::mcp::protocol::JsonRpcId;
use crate::mcp::registry::ToolDescriptor;

/// Longest slice of an error body carried into an error message
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Failure of a single remote tool call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProxyError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("tool server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response from tool server: {0}")]
    InvalidResponse(String),

    /// The tool server answered and reported a failure
    #[error("{0}")]
    Remote(String),
}

impl ProxyError {
    /// Short label used for the `outcome` metric dimension
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Timeout(_) => "timeout",
            ProxyError::Transport(_) => "transport",
            ProxyError::Status { .. } => "status",
            ProxyError::InvalidResponse(_) => "invalid_response",
            ProxyError::Remote(_) => "remote_error",
        }
    }
}

/// Anything that can carry out a tool call for the dispatcher
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Invoke `tool` and return the content the tool produced
    async fn invoke(
        &self,
        tool: &ToolDescriptor,
        request_id: &JsonRpcId,
        arguments: Value,
    ) -> Result<Value, ProxyError>;
}

/// Body POSTed to a tool endpoint
#[derive(Debug, Serialize)]
struct OutboundCall<'a> {
    tool_name: &'a str,
    arguments: &'a Value,
    request_id: &'a JsonRpcId,
}

/// HTTP implementation of [`ToolInvoker`]
#[derive(Debug, Clone)]
pub struct RemoteToolProxy {
    client: reqwest::Client,
    timeout: Duration,
}

impl RemoteToolProxy {
    pub fn new(timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mcp-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ToolInvoker for RemoteToolProxy {
    async fn invoke(
        &self,
        tool: &ToolDescriptor,
        request_id: &JsonRpcId,
        arguments: Value,
    ) -> Result<Value, ProxyError> {
        let payload = OutboundCall { tool_name: &tool.name, arguments: &arguments, request_id };

        debug!(tool = %tool.name, endpoint = %tool.endpoint, request_id = %request_id, "Calling remote tool");

        let response = self
            .client
            .post(tool.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProxyError::Timeout(self.timeout)
                } else {
                    ProxyError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ProxyError::Timeout(self.timeout)
            } else {
                ProxyError::Transport(format!("failed to read response body: {}", e))
            }
        })?;

        debug!(tool = %tool.name, status = %status, body_length = body.len(), "Remote tool responded");

        if !status.is_success() {
            warn!(tool = %tool.name, status = %status, "Remote tool returned non-success status");
            return Err(ProxyError::Status { status: status.as_u16(), body: truncate(&body) });
        }

        let reply: Value = serde_json::from_str(&body)
            .map_err(|e| ProxyError::InvalidResponse(format!("body is not JSON: {}", e)))?;

        interpret_reply(reply)
    }
}

/// Map a tool server's JSON reply to its content or a failure.
///
/// Accepts the MCP-style `{content, isError}` shape, an `error` field in any
/// of its common forms, and JSON-RPC-style `{result}` replies.
pub fn interpret_reply(reply: Value) -> Result<Value, ProxyError> {
    let Value::Object(mut body) = reply else {
        return Err(ProxyError::InvalidResponse("reply is not a JSON object".to_string()));
    };

    let flagged = body.get("isError").and_then(Value::as_bool).unwrap_or(false)
        || matches!(body.get("error"), Some(Value::Bool(true)));
    if flagged {
        let detail = body
            .get("content")
            .and_then(content_text)
            .unwrap_or_else(|| "tool reported an error".to_string());
        return Err(ProxyError::Remote(detail));
    }

    match body.get("error") {
        Some(Value::String(message)) => return Err(ProxyError::Remote(message.clone())),
        Some(Value::Object(error)) => {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(error.clone()).to_string());
            return Err(ProxyError::Remote(message));
        }
        _ => {}
    }

    if let Some(content) = body.remove("content") {
        return Ok(content);
    }

    match body.remove("result") {
        Some(Value::Object(mut result)) => match result.remove("content") {
            Some(content) => Ok(content),
            None => Ok(Value::Object(result)),
        },
        Some(result) => Ok(result),
        None => Err(ProxyError::InvalidResponse("reply has neither content nor result".to_string())),
    }
}

/// Text of every `{type: "text"}` item, one per line
fn content_text(content: &Value) -> Option<String> {
    let texts: Vec<&str> = match content {
        Value::Array(items) => {
            items.iter().filter_map(|item| item.get("text").and_then(Value::as_str)).collect()
        }
        Value::String(text) => vec![text.as_str()],
        _ => Vec::new(),
    };

    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let mut cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        cut.push_str("...");
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn descriptor(endpoint: String) -> ToolDescriptor {
        ToolDescriptor::from_config(&ToolConfig {
            name: "get_current_weather".to_string(),
            description: "Weather".to_string(),
            endpoint,
            input_schema: json!({"type": "object"}),
        })
        .unwrap()
    }

    #[test]
    fn test_interpret_content_reply() {
        let content = json!([{"type": "text", "text": "Sunny, 21C"}]);
        let result = interpret_reply(json!({"content": content, "isError": false})).unwrap();
        assert_eq!(result, content);
    }

    #[test]
    fn test_interpret_is_error_reply() {
        let err = interpret_reply(json!({
            "content": [{"type": "text", "text": "Missing location"}],
            "isError": true
        }))
        .unwrap_err();
        assert_eq!(err, ProxyError::Remote("Missing location".to_string()));
    }

    #[test]
    fn test_interpret_error_field_forms() {
        assert_eq!(
            interpret_reply(json!({"error": "quota exceeded"})).unwrap_err(),
            ProxyError::Remote("quota exceeded".to_string())
        );
        assert_eq!(
            interpret_reply(json!({"error": {"code": -1, "message": "bad sql"}})).unwrap_err(),
            ProxyError::Remote("bad sql".to_string())
        );
        assert_eq!(
            interpret_reply(json!({"error": true})).unwrap_err(),
            ProxyError::Remote("tool reported an error".to_string())
        );
    }

    #[test]
    fn test_interpret_json_rpc_result() {
        let content = json!([{"type": "text", "text": "ok"}]);
        assert_eq!(
            interpret_reply(json!({"jsonrpc": "2.0", "id": 1, "result": {"content": content}}))
                .unwrap(),
            content
        );
        assert_eq!(
            interpret_reply(json!({"result": {"rows": 3}})).unwrap(),
            json!({"rows": 3})
        );
        assert_eq!(interpret_reply(json!({"error": null, "result": 5})).unwrap(), json!(5));
    }

    #[test]
    fn test_interpret_rejects_unknown_shape() {
        assert!(matches!(
            interpret_reply(json!({"status": "ok"})).unwrap_err(),
            ProxyError::InvalidResponse(_)
        ));
        assert!(matches!(interpret_reply(json!([1, 2])).unwrap_err(), ProxyError::InvalidResponse(_)));
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(MAX_ERROR_BODY_CHARS + 10);
        let cut = truncate(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), MAX_ERROR_BODY_CHARS + 3);
    }

    #[tokio::test]
    async fn test_posts_outbound_contract() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/get_current_weather"))
            .and(body_json(json!({
                "tool_name": "get_current_weather",
                "arguments": {"location": "Paris"},
                "request_id": 42
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "Sunny"}],
                "isError": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let proxy = RemoteToolProxy::new(Duration::from_secs(5)).unwrap();
        let tool = descriptor(format!("{}/v1/get_current_weather", server.uri()));
        let content = proxy
            .invoke(&tool, &JsonRpcId::Number(42), json!({"location": "Paris"}))
            .await
            .unwrap();

        assert_eq!(content, json!([{"type": "text", "text": "Sunny"}]));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let proxy = RemoteToolProxy::new(Duration::from_secs(5)).unwrap();
        let tool = descriptor(format!("{}/tool", server.uri()));
        let err = proxy.invoke(&tool, &JsonRpcId::Number(1), json!({})).await.unwrap_err();

        assert_eq!(err, ProxyError::Status { status: 503, body: "upstream down".to_string() });
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let proxy = RemoteToolProxy::new(Duration::from_secs(5)).unwrap();
        let tool = descriptor(format!("{}/tool", server.uri()));
        let err = proxy.invoke(&tool, &JsonRpcId::Number(1), json!({})).await.unwrap_err();

        assert!(matches!(err, ProxyError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"content": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let proxy = RemoteToolProxy::new(Duration::from_millis(200)).unwrap();
        let tool = descriptor(format!("{}/slow", server.uri()));
        let err = proxy.invoke(&tool, &JsonRpcId::Number(1), json!({})).await.unwrap_err();

        assert_eq!(err, ProxyError::Timeout(Duration::from_millis(200)));
        assert_eq!(err.kind(), "timeout");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        // Port 9 (discard) is not expected to be listening in the test environment
        let proxy = RemoteToolProxy::new(Duration::from_secs(2)).unwrap();
        let tool = descriptor("http://127.0.0.1:9/tool".to_string());
        let err = proxy.invoke(&tool, &JsonRpcId::Number(1), json!({})).await.unwrap_err();

        assert!(matches!(err, ProxyError::Transport(_) | ProxyError::Timeout(_)));
    }
}
