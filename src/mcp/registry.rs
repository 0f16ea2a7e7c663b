//! Tool Registry
//!
//! Immutable mapping from tool name to [`ToolDescriptor`], built once from
//! configuration. Reload never mutates a registry in place: a new one is
//! built and swapped into the [`RegistryHandle`], so a request keeps the
//! snapshot it started with.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use jsonschema::{Draft, Validator};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ToolConfig;
use crate::mcp::protocol::Tool;

/// A remote tool the gateway can dispatch to
#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub endpoint: Url,
    validator: Option<Arc<Validator>>,
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint.as_str())
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// A single schema violation found in call arguments
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ArgumentViolation {
    /// JSON pointer into the arguments (empty for the root)
    pub path: String,
    pub message: String,
}

impl fmt::Display for ArgumentViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl ToolDescriptor {
    /// Build a descriptor from a configuration record
    pub fn from_config(config: &ToolConfig) -> Result<Self, RegistryError> {
        if config.name.trim().is_empty() {
            return Err(RegistryError::MissingName { endpoint: config.endpoint.clone() });
        }

        if !config.input_schema.is_object() {
            return Err(RegistryError::InvalidSchema { name: config.name.clone() });
        }

        let endpoint = Url::parse(&config.endpoint).map_err(|e| RegistryError::InvalidEndpoint {
            name: config.name.clone(),
            endpoint: config.endpoint.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(RegistryError::InvalidEndpoint {
                name: config.name.clone(),
                endpoint: config.endpoint.clone(),
                reason: format!("unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        let validator = match Validator::options().with_draft(Draft::Draft7).build(&config.input_schema)
        {
            Ok(validator) => Some(Arc::new(validator)),
            Err(e) => {
                warn!(tool = %config.name, error = %e, "Input schema does not compile, argument validation disabled for tool");
                None
            }
        };

        Ok(Self {
            name: config.name.clone(),
            description: config.description.clone(),
            input_schema: config.input_schema.clone(),
            endpoint,
            validator,
        })
    }

    /// Check arguments against the compiled input schema.
    ///
    /// Tools whose schema failed to compile accept anything.
    pub fn check_arguments(&self, arguments: &Value) -> Result<(), Vec<ArgumentViolation>> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };

        let violations: Vec<ArgumentViolation> = validator
            .iter_errors(arguments)
            .map(|e| ArgumentViolation { path: e.instance_path.to_string(), message: e.to_string() })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Listing shape used by `tools/list`
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
        }
    }
}

/// A configuration record that was left out of the registry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate tool name '{0}', keeping the first definition")]
    DuplicateName(String),

    #[error("Tool '{name}' has invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { name: String, endpoint: String, reason: String },

    #[error("Tool record for endpoint '{endpoint}' has no name")]
    MissingName { endpoint: String },

    #[error("Tool '{name}' input_schema must be a mapping")]
    InvalidSchema { name: String },
}

/// Read-only set of tools in registration order
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build a registry, returning the records that were rejected
    pub fn build(configs: &[ToolConfig]) -> (Self, Vec<RegistryError>) {
        let mut registry = Self::default();
        let mut rejected = Vec::new();

        for config in configs {
            if registry.index.contains_key(&config.name) {
                rejected.push(RegistryError::DuplicateName(config.name.clone()));
                continue;
            }

            match ToolDescriptor::from_config(config) {
                Ok(descriptor) => {
                    registry.index.insert(descriptor.name.clone(), registry.tools.len());
                    registry.tools.push(descriptor);
                }
                Err(e) => rejected.push(e),
            }
        }

        (registry, rejected)
    }

    /// Build a registry, logging every rejected record
    pub fn from_config(configs: &[ToolConfig]) -> Self {
        let (registry, rejected) = Self::build(configs);
        for error in &rejected {
            warn!(error = %error, "Skipping tool record");
        }
        debug!(tools = registry.len(), rejected = rejected.len(), "Built tool registry");
        registry
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn list_all(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }

    /// `(name, endpoint)` pairs in registration order
    pub fn endpoints(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tools.iter().map(|t| (t.name.as_str(), t.endpoint.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Shared handle to the current registry
#[derive(Debug)]
pub struct RegistryHandle {
    current: ArcSwap<ToolRegistry>,
}

impl RegistryHandle {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { current: ArcSwap::from_pointee(registry) }
    }

    /// Registry as of now; unaffected by later swaps
    pub fn snapshot(&self) -> Arc<ToolRegistry> {
        self.current.load_full()
    }

    /// Swap in a new registry, returning the previous one
    pub fn replace(&self, registry: ToolRegistry) -> Arc<ToolRegistry> {
        self.current.swap(Arc::new(registry))
    }
}
