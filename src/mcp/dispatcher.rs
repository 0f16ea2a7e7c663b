//! MCP Request Dispatcher
//!
//! Routes a validated request by method, consults the tool registry and
//! delegates `tools/call` to a [`ToolInvoker`]. Notifications are processed
//! like any other request but never produce a response.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Map, Value};
use tracing::{debug, warn, Instrument, Span};
use uuid::Uuid;

use crate::mcp::error::McpError;
use crate::mcp::protocol::{
    methods, InitializeResult, JsonRpcId, JsonRpcRequest, JsonRpcResponse, ServerCapabilities,
    ServerInfo, ToolCallParams, ToolCallResult, ToolsListResult, PROTOCOL_VERSION,
};
use crate::mcp::proxy::ToolInvoker;
use crate::mcp::registry::RegistryHandle;
use crate::observability::MetricsRecorder;

pub struct Dispatcher {
    registry: Arc<RegistryHandle>,
    invoker: Arc<dyn ToolInvoker>,
    server_info: ServerInfo,
    validate_arguments: bool,
    metrics: MetricsRecorder,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<RegistryHandle>,
        invoker: Arc<dyn ToolInvoker>,
        server_info: ServerInfo,
    ) -> Self {
        Self {
            registry,
            invoker,
            server_info,
            validate_arguments: false,
            metrics: MetricsRecorder::new(),
        }
    }

    /// Check `tools/call` arguments against the tool's input schema before
    /// forwarding them
    pub fn with_argument_validation(mut self, enabled: bool) -> Self {
        self.validate_arguments = enabled;
        self
    }

    pub fn registry(&self) -> &Arc<RegistryHandle> {
        &self.registry
    }

    /// Parse a raw payload and dispatch it.
    ///
    /// A payload that is not a request at all always gets an error response,
    /// since there is no way to tell whether it was meant as a notification.
    pub async fn dispatch_bytes(&self, bytes: &[u8]) -> Option<JsonRpcResponse> {
        match JsonRpcRequest::from_slice(bytes) {
            Ok(request) => self.dispatch(request).await,
            Err(rejected) => {
                warn!(id = %rejected.id, error = %rejected.error, "Rejected malformed payload");
                self.metrics.record_rpc_request("invalid", rejected.error.outcome());
                Some(rejected.into_response())
            }
        }
    }

    /// Handle one request. Returns `None` for notifications.
    pub async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let span = crate::rpc_span!(request.method, request.id);
        self.dispatch_inner(request).instrument(span).await
    }

    async fn dispatch_inner(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        let method_label = metric_method_label(&request.method);

        debug!("Handling MCP request");

        let outcome = self.route(request).await;

        match &outcome {
            Ok(_) => self.metrics.record_rpc_request(method_label, "success"),
            Err(e) => {
                debug!(error = %e, code = e.error_code(), "MCP request failed");
                self.metrics.record_rpc_request(method_label, e.outcome());
            }
        }

        let Some(id) = id else {
            debug!("Notification handled, no response");
            return None;
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::from_error(id, &error),
        })
    }

    async fn route(&self, request: JsonRpcRequest) -> Result<Value, McpError> {
        request.validate()?;

        match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(),
            methods::INITIALIZED | methods::PING => Ok(json!({})),
            methods::TOOLS_LIST => self.handle_tools_list(),
            methods::TOOLS_CALL => self.handle_tools_call(request.id.as_ref(), request.params).await,
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    fn handle_initialize(&self) -> Result<Value, McpError> {
        let registry = self.registry.snapshot();
        let tools: Map<String, Value> = registry
            .list_all()
            .iter()
            .map(|tool| (tool.name.clone(), tool.input_schema.clone()))
            .collect();

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities { tools },
            server_info: self.server_info.clone(),
        };

        Ok(serde_json::to_value(result)?)
    }

    fn handle_tools_list(&self) -> Result<Value, McpError> {
        let registry = self.registry.snapshot();
        let result =
            ToolsListResult { tools: registry.list_all().iter().map(|t| t.to_tool()).collect() };

        debug!(tool_count = result.tools.len(), "Listing tools");
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_call(
        &self,
        id: Option<&JsonRpcId>,
        params: Option<Map<String, Value>>,
    ) -> Result<Value, McpError> {
        let params = params
            .ok_or_else(|| McpError::InvalidParams("Missing params for tools/call".to_string()))?;

        let call: ToolCallParams = serde_json::from_value(Value::Object(params))
            .map_err(|e| McpError::InvalidParams(format!("Invalid tools/call params: {}", e)))?;

        Span::current().record("tool", call.name.as_str());

        let registry = self.registry.snapshot();
        let tool =
            registry.lookup(&call.name).ok_or_else(|| McpError::ToolNotFound(call.name.clone()))?;

        let arguments = Value::Object(call.arguments.unwrap_or_default());

        if self.validate_arguments {
            tool.check_arguments(&arguments).map_err(|violations| {
                let details: Vec<String> = violations.iter().map(ToString::to_string).collect();
                McpError::InvalidParams(format!(
                    "Arguments for tool '{}' do not match its input schema: {}",
                    tool.name,
                    details.join("; ")
                ))
            })?;
        }

        let request_id = id.cloned().unwrap_or_else(|| JsonRpcId::String(Uuid::new_v4().to_string()));

        let started = Instant::now();
        let result = self.invoker.invoke(tool, &request_id, arguments).await;
        let elapsed = started.elapsed().as_secs_f64();

        let content = match result {
            Ok(content) => {
                self.metrics.record_tool_call(&tool.name, "success", elapsed);
                debug!(duration_seconds = elapsed, "Tool call succeeded");
                content
            }
            Err(e) => {
                self.metrics.record_tool_call(&tool.name, e.kind(), elapsed);
                warn!(error = %e, duration_seconds = elapsed, "Tool call failed");
                return Err(e.into());
            }
        };

        Ok(serde_json::to_value(ToolCallResult::success(content))?)
    }
}

/// Bounded label set for the `method` metric dimension
fn metric_method_label(method: &str) -> &'static str {
    match method {
        methods::INITIALIZE => methods::INITIALIZE,
        methods::INITIALIZED => methods::INITIALIZED,
        methods::PING => methods::PING,
        methods::TOOLS_LIST => methods::TOOLS_LIST,
        methods::TOOLS_CALL => methods::TOOLS_CALL,
        _ => "unknown",
    }
}
