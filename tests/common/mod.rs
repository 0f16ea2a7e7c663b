//! Shared helpers for gateway integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use mcp_gateway::config::{GatewayConfig, ToolConfig};
use mcp_gateway::mcp::{JsonRpcId, ProxyError, ToolDescriptor, ToolInvoker};
use mcp_gateway::startup::GatewayContext;
use serde_json::{json, Value};
use tower::ServiceExt;

pub fn weather_tool(endpoint: &str) -> ToolConfig {
    ToolConfig {
        name: "get_current_weather".to_string(),
        description: "Get current weather for a location".to_string(),
        endpoint: endpoint.to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {"location": {"type": "string"}},
            "required": ["location"]
        }),
    }
}

pub fn sql_tool(endpoint: &str) -> ToolConfig {
    ToolConfig {
        name: "generate_sql".to_string(),
        description: "Generate SQL for a stream".to_string(),
        endpoint: endpoint.to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {"streamid": {"type": "string"}, "sql_content": {"type": "string"}},
            "required": ["streamid", "sql_content"]
        }),
    }
}

pub fn config_with_tools(tools: Vec<ToolConfig>) -> GatewayConfig {
    GatewayConfig { tools, ..Default::default() }
}

/// One recorded invocation
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub tool: String,
    pub request_id: JsonRpcId,
    pub arguments: Value,
}

/// Invoker that answers from a per-tool script and records every call
#[derive(Default)]
pub struct ScriptedInvoker {
    replies: HashMap<String, Result<Value, ProxyError>>,
    calls: Mutex<Vec<RecordedCall>>,
    panic_on: Option<String>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, tool: &str, reply: Result<Value, ProxyError>) -> Self {
        self.replies.insert(tool.to_string(), reply);
        self
    }

    pub fn panic_on(mut self, tool: &str) -> Self {
        self.panic_on = Some(tool.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        tool: &ToolDescriptor,
        request_id: &JsonRpcId,
        arguments: Value,
    ) -> Result<Value, ProxyError> {
        if self.panic_on.as_deref() == Some(tool.name.as_str()) {
            panic!("scripted panic for {}", tool.name);
        }

        self.calls.lock().unwrap().push(RecordedCall {
            tool: tool.name.clone(),
            request_id: request_id.clone(),
            arguments,
        });

        self.replies
            .get(&tool.name)
            .cloned()
            .unwrap_or_else(|| Ok(json!([{"type": "text", "text": "ok"}])))
    }
}

pub fn context_with(config: &GatewayConfig, invoker: Arc<ScriptedInvoker>) -> Arc<GatewayContext> {
    Arc::new(GatewayContext::with_invoker(config, invoker, None))
}

/// Send a request through the router and return status and parsed body
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Vec<u8>>,
) -> (StatusCode, Option<Value>, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder.body(body.map(Body::from).unwrap_or_else(Body::empty)).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
    let json = serde_json::from_slice(&bytes).ok();
    (status, json, bytes)
}

pub async fn post_rpc(router: &Router, payload: &Value) -> (StatusCode, Option<Value>) {
    let (status, json, _) =
        send(router, Method::POST, "/mcp", Some(serde_json::to_vec(payload).unwrap())).await;
    (status, json)
}
