//! Tool: zep_search_memory — Semantic search over the knowledge graph.

use serde::Deserialize;
use serde_json::{json, Value};

use zep_cloud::{ZepClient, DEFAULT_SEARCH_LIMIT};

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

pub const NAME: &str = "zep_search_memory";

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

/// Return the tool definition for zep_search_memory.
pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_string(),
        description: Some(
            "Semantic search across the user's knowledge graph. Returns matching facts \
             (edges) and entities (nodes) ranked by relevance. Use this to recall information \
             about the user or previously stored context."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Natural language search query."
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Maximum number of results to return.",
                    "default": DEFAULT_SEARCH_LIMIT
                }
            },
            "required": ["query"]
        }),
    }
}

/// Execute the zep_search_memory tool.
pub async fn execute(args: Value, client: &ZepClient) -> McpResult<ToolCallResult> {
    let params: SearchParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;
    super::require_positive("limit", Some(params.limit))?;

    let result = client.search_graph(&params.query, params.limit).await?;
    Ok(ToolCallResult::json(&result))
}
