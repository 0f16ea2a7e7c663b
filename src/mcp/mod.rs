//! MCP (Model Context Protocol) Gateway Core
//!
//! JSON-RPC envelope handling, the tool registry, the remote tool proxy and
//! the dispatcher that ties them together.

pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod proxy;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use error::McpError;
pub use protocol::*;
pub use proxy::{interpret_reply, ProxyError, RemoteToolProxy, ToolInvoker};
pub use registry::{ArgumentViolation, RegistryError, RegistryHandle, ToolDescriptor, ToolRegistry};
