//! Tool invocation over MCP Streamable HTTP: the three tool servers
//! (`application_verification`, `document_processing`, `financial_calculations`) are reached
//! through this module, never called directly by an agent.

pub mod adapter;
pub mod mcp;

use serde_json::Value;
use thiserror::Error;

pub use adapter::ToolInvocationAdapter;
pub use mcp::McpToolSource;

/// One tool advertised by a `tools/list` call.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// The text payload of a `tools/call` result, already unwrapped from its MCP content blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCallContent {
    pub text: String,
}

/// Failure talking to a tool server, independent of which specific server it was.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("json-rpc error: {0}")]
    JsonRpc(String),
}

/// A connected, initialized MCP tool endpoint: `list_tools`/`call_tool` over one session.
#[async_trait::async_trait]
pub trait ToolSource: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError>;
}
