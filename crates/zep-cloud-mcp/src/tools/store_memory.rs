//! Tool: zep_store_memory — Append a message to a thread.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use zep_cloud::{Role, ZepClient};

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

pub const NAME: &str = "zep_store_memory";

#[derive(Debug, Deserialize)]
struct StoreParams {
    session_id: String,
    content: String,
    #[serde(default)]
    role: Role,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

/// Return the tool definition for zep_store_memory.
pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_string(),
        description: Some(
            "Store content in a Zep memory thread. Creates the thread automatically if it \
             doesn't exist. Use this to save conversation context, facts, or any information \
             that should be remembered across sessions."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "session_id": {
                    "type": "string",
                    "description": "Thread/session identifier. Use a consistent ID to group related memories."
                },
                "content": {
                    "type": "string",
                    "description": "The content to store in memory."
                },
                "role": {
                    "type": "string",
                    "enum": ["user", "assistant", "system"],
                    "description": "Message role: 'user', 'assistant', or 'system'.",
                    "default": "assistant"
                },
                "metadata": {
                    "type": "object",
                    "description": "Optional key/value metadata attached to the message."
                }
            },
            "required": ["session_id", "content"]
        }),
    }
}

/// Execute the zep_store_memory tool.
pub async fn execute(args: Value, client: &ZepClient) -> McpResult<ToolCallResult> {
    let params: StoreParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let result = client
        .store_memory(
            &params.session_id,
            &params.content,
            params.role,
            params.metadata,
        )
        .await?;

    Ok(ToolCallResult::json(&result))
}
