//! Tool: zep_get_graph_edges — List facts in the knowledge graph.

use serde::Deserialize;
use serde_json::{json, Value};

use zep_cloud::{ZepClient, DEFAULT_LIST_LIMIT};

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

pub const NAME: &str = "zep_get_graph_edges";

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

/// Return the tool definition for zep_get_graph_edges.
pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_string(),
        description: Some(
            "List all relationships (edges/facts) in the user's knowledge graph. Each edge \
             represents a fact connecting two entities, e.g. 'Alice WORKS_AT Acme Corp'."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Maximum number of edges to return.",
                    "default": DEFAULT_LIST_LIMIT
                }
            }
        }),
    }
}

/// Execute the zep_get_graph_edges tool.
pub async fn execute(args: Value, client: &ZepClient) -> McpResult<ToolCallResult> {
    let params: ListParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;
    super::require_positive("limit", Some(params.limit))?;

    let result = client.get_graph_edges(params.limit).await?;
    Ok(ToolCallResult::json(&result))
}
