//! # Metrics Collection
//!
//! Prometheus metrics for RPC traffic and remote tool calls. Without an
//! installed recorder the `metrics` macros are no-ops, so recording is
//! unconditional.

use crate::config::MetricsConfig;
use crate::errors::{GatewayError, Result};
use ::tracing::info;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Metrics recorder that tracks gateway metrics
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    /// Create a new metrics recorder instance
    pub fn new() -> Self {
        Self
    }

    /// Record a handled JSON-RPC request
    pub fn record_rpc_request(&self, method: &str, outcome: &str) {
        let labels = [("method", method.to_string()), ("outcome", outcome.to_string())];
        counter!("mcp_requests_total", &labels).increment(1);
    }

    /// Record a completed remote tool call and its duration in seconds
    pub fn record_tool_call(&self, tool: &str, outcome: &str, duration: f64) {
        let labels = [("tool", tool.to_string()), ("outcome", outcome.to_string())];
        counter!("mcp_tool_calls_total", &labels).increment(1);

        let duration_labels = [("tool", tool.to_string())];
        histogram!("mcp_tool_call_duration_seconds", &duration_labels).record(duration);
    }

    /// Update the registered tool gauge
    pub fn set_registered_tools(&self, count: usize) {
        gauge!("mcp_registered_tools").set(count as f64);
    }

    /// Record a registry reload attempt
    pub fn record_registry_reload(&self, success: bool) {
        let status = if success { "success" } else { "error" };
        counter!("mcp_registry_reloads_total", "status" => status).increment(1);
    }

    /// Register metric descriptions
    pub fn register_gateway_metrics(&self) {
        describe_counter!("mcp_requests_total", Unit::Count, "JSON-RPC requests by method and outcome");
        describe_counter!(
            "mcp_tool_calls_total",
            Unit::Count,
            "Remote tool calls by tool and outcome"
        );
        describe_histogram!(
            "mcp_tool_call_duration_seconds",
            Unit::Seconds,
            "Remote tool call latency"
        );
        describe_gauge!("mcp_registered_tools", Unit::Count, "Tools in the current registry");
        describe_counter!(
            "mcp_registry_reloads_total",
            Unit::Count,
            "Registry reload attempts by status"
        );
    }
}

/// Install the Prometheus recorder and return the handle used to render the
/// scrape endpoint. Returns `None` when metrics are disabled.
pub fn init_metrics(config: &MetricsConfig) -> Result<Option<PrometheusHandle>> {
    if !config.enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .add_global_label("service", crate::APP_NAME)
        .install_recorder()
        .map_err(|e| GatewayError::config(format!("Failed to initialize metrics exporter: {}", e)))?;

    MetricsRecorder::new().register_gateway_metrics();

    info!(path = %config.path, "Metrics collection initialized");

    Ok(Some(handle))
}
