use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::{HEALTH_PATH, PING_PATH, TOOLS_PATH};
use crate::startup::GatewayContext;

use super::handlers::{
    health_handler, list_tools_handler, metrics_handler, ping_handler, rpc_handler,
};

#[derive(Clone)]
pub struct ApiState {
    pub context: Arc<GatewayContext>,
}

/// Build the gateway router: the RPC endpoint, health checks, registry inspection
/// and (when enabled) the Prometheus scrape endpoint
pub fn build_router(context: Arc<GatewayContext>) -> Router {
    let max_body_size = context.max_body_size;

    let mut router = Router::new()
        .route(&context.rpc_path, post(rpc_handler))
        .route(HEALTH_PATH, get(health_handler))
        .route(PING_PATH, get(ping_handler))
        .route(TOOLS_PATH, get(list_tools_handler));

    if context.metrics_handle.is_some() {
        router = router.route(&context.metrics_path, get(metrics_handler));
    }

    router
        .with_state(ApiState { context })
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
}
