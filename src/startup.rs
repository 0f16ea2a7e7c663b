//! Startup wiring for the MCP gateway
//!
//! Builds the [`GatewayContext`] that owns the registry handle, the outbound
//! proxy and the dispatcher, and installs the SIGHUP registry reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

use crate::config::{load_config_strict, GatewayConfig};
use crate::errors::Result;
use crate::mcp::{Dispatcher, RegistryHandle, RemoteToolProxy, ServerInfo, ToolInvoker, ToolRegistry};
use crate::observability::MetricsRecorder;

/// Everything a running gateway needs, built once at startup
pub struct GatewayContext {
    pub registry: Arc<RegistryHandle>,
    pub dispatcher: Arc<Dispatcher>,
    pub rpc_path: String,
    pub max_body_size: usize,
    pub metrics_path: String,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl GatewayContext {
    /// Build the context with the HTTP tool proxy
    pub fn build(config: &GatewayConfig, metrics_handle: Option<PrometheusHandle>) -> Result<Self> {
        let proxy = RemoteToolProxy::new(config.http.timeout())?;
        Ok(Self::with_invoker(config, Arc::new(proxy), metrics_handle))
    }

    /// Build the context around any tool invoker
    pub fn with_invoker(
        config: &GatewayConfig,
        invoker: Arc<dyn ToolInvoker>,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        let registry = ToolRegistry::from_config(&config.tools);
        MetricsRecorder::new().set_registered_tools(registry.len());
        info!(tools = registry.len(), "Tool registry loaded");

        let registry = Arc::new(RegistryHandle::new(registry));
        let server_info = ServerInfo {
            name: config.server_info.name.clone(),
            version: config.server_info.version.clone(),
        };
        let dispatcher = Dispatcher::new(Arc::clone(&registry), invoker, server_info)
            .with_argument_validation(config.validate_arguments);

        Self {
            registry,
            dispatcher: Arc::new(dispatcher),
            rpc_path: config.rpc_path.clone(),
            max_body_size: config.server.max_body_size,
            metrics_path: config.metrics.path.clone(),
            metrics_handle,
        }
    }

    /// Re-read the tool list from `path` and swap it in.
    ///
    /// Only the registry is replaced; server, client and logging settings
    /// take effect on restart. On error the current registry stays.
    pub fn reload_registry(&self, path: &Path) -> Result<usize> {
        let metrics = MetricsRecorder::new();
        let config = match load_config_strict(path) {
            Ok(config) => config,
            Err(e) => {
                metrics.record_registry_reload(false);
                return Err(e);
            }
        };

        let registry = ToolRegistry::from_config(&config.tools);
        let count = registry.len();
        let previous = self.registry.replace(registry);

        metrics.record_registry_reload(true);
        metrics.set_registered_tools(count);
        info!(previous = previous.len(), current = count, "Tool registry reloaded");

        Ok(count)
    }
}

/// Reload the registry from `config_path` on every SIGHUP
#[cfg(unix)]
pub fn spawn_reload_on_sighup(context: Arc<GatewayContext>, config_path: PathBuf) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangups = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "Failed to install SIGHUP handler, registry reload disabled");
                return;
            }
        };

        while hangups.recv().await.is_some() {
            info!(path = %config_path.display(), "SIGHUP received, reloading tool registry");
            if let Err(e) = context.reload_registry(&config_path) {
                warn!(error = %e, "Registry reload failed, keeping current tools");
            }
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_reload_on_sighup(_context: Arc<GatewayContext>, _config_path: PathBuf) {
    warn!("Registry reload on SIGHUP is only available on unix");
}
