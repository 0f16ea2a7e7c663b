//! HTTP handlers for the gateway endpoints

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::FutureExt;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::mcp::{JsonRpcId, JsonRpcResponse, McpError};

use super::routes::ApiState;

/// Entry in the `GET /tools` listing
#[derive(Debug, Serialize)]
pub struct ToolEndpoint {
    pub name: String,
    pub endpoint: String,
}

/// `POST <rpc_path>`: one JSON-RPC request in, one envelope out.
///
/// Notifications are answered with `202 Accepted` and no body. A panic
/// while dispatching becomes an internal-error envelope.
pub async fn rpc_handler(State(state): State<ApiState>, body: Bytes) -> Response {
    let dispatcher = Arc::clone(&state.context.dispatcher);
    let payload = body.clone();

    let outcome =
        AssertUnwindSafe(async move { dispatcher.dispatch_bytes(&payload).await }).catch_unwind().await;

    match outcome {
        Ok(Some(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(None) => StatusCode::ACCEPTED.into_response(),
        Err(panic) => {
            let detail = panic_message(panic.as_ref());
            error!(panic = %detail, "Dispatcher panicked while handling request");

            let raw: Option<Value> = serde_json::from_slice(&body).ok();
            let notification = raw
                .as_ref()
                .map(|v| v.is_object() && v.get("id").map_or(true, Value::is_null))
                .unwrap_or(false);
            if notification {
                return StatusCode::ACCEPTED.into_response();
            }

            let id = raw.as_ref().map(JsonRpcId::recover).unwrap_or(JsonRpcId::PLACEHOLDER);
            let response = JsonRpcResponse::from_error(
                id,
                &McpError::InternalError("unexpected failure while handling request".to_string()),
            );
            (StatusCode::OK, Json(response)).into_response()
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

pub async fn ping_handler() -> Json<Value> {
    Json(json!({"pong": true}))
}

/// `GET /tools`: registered tools and their endpoints, in registration order
pub async fn list_tools_handler(State(state): State<ApiState>) -> Json<Vec<ToolEndpoint>> {
    let registry = state.context.registry.snapshot();
    Json(
        registry
            .endpoints()
            .map(|(name, endpoint)| ToolEndpoint {
                name: name.to_string(),
                endpoint: endpoint.to_string(),
            })
            .collect(),
    )
}

pub async fn metrics_handler(State(state): State<ApiState>) -> Response {
    match &state.context.metrics_handle {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
