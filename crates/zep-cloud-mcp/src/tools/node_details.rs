//! Tool: zep_get_node_details — One entity with its edges and episodes.

use serde::Deserialize;
use serde_json::{json, Value};

use zep_cloud::ZepClient;

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

pub const NAME: &str = "zep_get_node_details";

#[derive(Debug, Deserialize)]
struct DetailsParams {
    node_uuid: String,
}

/// Return the tool definition for zep_get_node_details.
pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_string(),
        description: Some(
            "Get detailed information about a specific entity node, including all its \
             relationships (edges) and the episodes (conversation excerpts) where it was mentioned."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "node_uuid": {
                    "type": "string",
                    "description": "UUID of the node to get details for."
                }
            },
            "required": ["node_uuid"]
        }),
    }
}

/// Execute the zep_get_node_details tool.
pub async fn execute(args: Value, client: &ZepClient) -> McpResult<ToolCallResult> {
    let params: DetailsParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let result = client.get_node_details(&params.node_uuid).await?;
    Ok(ToolCallResult::json(&result))
}
