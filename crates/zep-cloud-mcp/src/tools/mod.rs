//! Tool registry and dispatch.

pub mod get_memory;
pub mod graph_edges;
pub mod graph_nodes;
pub mod node_details;
pub mod search_memory;
pub mod store_memory;
pub mod thread_context;

use serde_json::{Map, Value};

use crate::context::ServerContext;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

/// Reject a count the schema bounds at `minimum: 1`.
fn require_positive(field: &str, value: Option<u32>) -> McpResult<()> {
    match value {
        Some(0) => Err(McpError::InvalidParams(format!(
            "{field} must be at least 1"
        ))),
        _ => Ok(()),
    }
}

/// The fixed catalog of tools this server exposes.
pub struct ToolRegistry;

impl ToolRegistry {
    /// List all available tool definitions.
    pub fn list_tools() -> Vec<ToolDefinition> {
        vec![
            store_memory::definition(),
            search_memory::definition(),
            get_memory::definition(),
            graph_nodes::definition(),
            graph_edges::definition(),
            node_details::definition(),
            thread_context::definition(),
        ]
    }

    /// Run a tool, surfacing failures as errors.
    pub async fn call(
        name: &str,
        arguments: Option<Value>,
        context: &ServerContext,
    ) -> McpResult<ToolCallResult> {
        let client = context.client()?;
        let args = match arguments {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(args) => args,
        };

        match name {
            store_memory::NAME => store_memory::execute(args, client).await,
            search_memory::NAME => search_memory::execute(args, client).await,
            get_memory::NAME => get_memory::execute(args, client).await,
            graph_nodes::NAME => graph_nodes::execute(args, client).await,
            graph_edges::NAME => graph_edges::execute(args, client).await,
            node_details::NAME => node_details::execute(args, client).await,
            thread_context::NAME => thread_context::execute(args, client).await,
            _ => Err(McpError::ToolNotFound(name.to_string())),
        }
    }

    /// Run a tool and fold any failure into an `{"error": ...}` result.
    pub async fn dispatch(
        name: &str,
        arguments: Option<Value>,
        context: &ServerContext,
    ) -> ToolCallResult {
        match Self::call(name, arguments, context).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Error in tool {name}: {e}");
                ToolCallResult::error(&e.to_string())
            }
        }
    }
}
