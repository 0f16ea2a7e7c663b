//! # Observability Infrastructure
//!
//! Structured logging and Prometheus metrics for the gateway.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, log_config_info};
pub use metrics::{init_metrics, MetricsRecorder};

use crate::config::GatewayConfig;
use crate::errors::Result;
use ::tracing::info;
use metrics_exporter_prometheus::PrometheusHandle;

/// Initialize logging and metrics.
///
/// Returns the Prometheus handle when metrics are enabled.
pub fn init_observability(config: &GatewayConfig, verbose: bool) -> Result<Option<PrometheusHandle>> {
    init_logging(&config.logging, verbose)?;
    let handle = init_metrics(&config.metrics)?;

    info!(
        log_level = %config.logging.level,
        json_logs = config.logging.json,
        metrics_enabled = handle.is_some(),
        "Observability initialized successfully"
    );

    Ok(handle)
}
