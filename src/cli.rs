//! # Command Line Interface
//!
//! `serve` runs the gateway, `check` validates a configuration file and
//! `tools` prints the tools a configuration would register.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::start_gateway_server;
use crate::config::{load_config, load_config_strict, GatewayConfig, DEFAULT_CONFIG_PATH};
use crate::mcp::ToolRegistry;
use crate::observability::{init_observability, log_config_info};
use crate::startup::{spawn_reload_on_sighup, GatewayContext};
use crate::{APP_NAME, VERSION};

#[derive(Parser)]
#[command(name = "mcp-gateway")]
#[command(about = "JSON-RPC MCP gateway for remote HTTP tool servers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the gateway (default)
    Serve {
        /// Address to bind to, overrides the configuration
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to, overrides the configuration
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Strictly load the configuration and report problems
    Check,

    /// Print the tools the configuration registers
    Tools {
        /// Output format (table, json, yaml)
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

impl OutputFormat {
    /// Parse output format from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "table" => Ok(OutputFormat::Table),
            _ => anyhow::bail!(
                "Unsupported output format: '{}'. Use 'json', 'yaml', or 'table'.",
                s
            ),
        }
    }
}

/// Row printed by `tools`
#[derive(Debug, Serialize)]
pub struct ToolRow {
    pub name: String,
    pub endpoint: String,
    pub description: String,
}

/// Run CLI commands
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => serve(&cli.config, cli.verbose, None, None).await,
        Some(Commands::Serve { host, port }) => serve(&cli.config, cli.verbose, host, port).await,
        Some(Commands::Check) => check(&cli.config),
        Some(Commands::Tools { output }) => print_tools(&cli.config, OutputFormat::parse(&output)?),
    }
}

async fn serve(
    config_path: &Path,
    verbose: bool,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    // Strict first so the failure can be logged once a subscriber exists.
    // The lenient load keeps the file when only tool records are bad.
    let (mut config, load_error) = match load_config_strict(config_path) {
        Ok(config) => (config, None),
        Err(e) => (load_config(config_path), Some(e)),
    };

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let metrics_handle = init_observability(&config, verbose)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting MCP gateway");
    match load_error {
        Some(_) if !config_path.exists() => {
            info!(path = %config_path.display(), "No configuration file, running with defaults")
        }
        Some(e) => warn!(path = %config_path.display(), error = %e, "Configuration failed strict validation, loaded leniently"),
        None => info!(path = %config_path.display(), "Loaded configuration"),
    }
    log_config_info(&config);

    let context = Arc::new(GatewayContext::build(&config, metrics_handle)?);
    spawn_reload_on_sighup(Arc::clone(&context), config_path.to_path_buf());

    start_gateway_server(&config.server.host, config.server.port, context).await?;
    Ok(())
}

fn check(config_path: &Path) -> Result<()> {
    let config = load_config_strict(config_path)
        .with_context(|| format!("Configuration '{}' is invalid", config_path.display()))?;

    let (registry, rejected) = ToolRegistry::build(&config.tools);
    for error in &rejected {
        eprintln!("rejected: {}", error);
    }

    if !rejected.is_empty() {
        anyhow::bail!("{} tool record(s) would be skipped", rejected.len());
    }

    println!(
        "Configuration OK: {} tool(s), serving {} on {}",
        registry.len(),
        config.rpc_path,
        config.server.bind_address()
    );
    Ok(())
}

fn print_tools(config_path: &Path, format: OutputFormat) -> Result<()> {
    let config = if config_path.exists() {
        load_config_strict(config_path)
            .with_context(|| format!("Configuration '{}' is invalid", config_path.display()))?
    } else {
        GatewayConfig::default()
    };

    let rows = tool_rows(&config);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows).context("Failed to serialize to JSON")?)
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&rows).context("Failed to serialize to YAML")?)
        }
        OutputFormat::Table => print_tools_table(&rows),
    }
    Ok(())
}

/// Tools in registration order, after duplicate and endpoint filtering
pub fn tool_rows(config: &GatewayConfig) -> Vec<ToolRow> {
    let (registry, _) = ToolRegistry::build(&config.tools);
    registry
        .list_all()
        .iter()
        .map(|tool| ToolRow {
            name: tool.name.clone(),
            endpoint: tool.endpoint.to_string(),
            description: tool.description.clone(),
        })
        .collect()
}

fn print_tools_table(rows: &[ToolRow]) {
    if rows.is_empty() {
        println!("No tools configured");
        return;
    }

    let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(4);
    let endpoint_width = rows.iter().map(|r| r.endpoint.len()).max().unwrap_or(0).max(8);

    println!("{:<name_width$}  {:<endpoint_width$}  DESCRIPTION", "NAME", "ENDPOINT");
    for row in rows {
        println!("{:<name_width$}  {:<endpoint_width$}  {}", row.name, row.endpoint, row.description);
    }
}
