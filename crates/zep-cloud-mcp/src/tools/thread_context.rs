//! Tool: zep_get_thread_context — Cross-thread context for a session.

use serde::Deserialize;
use serde_json::{json, Value};

use zep_cloud::{ZepClient, DEFAULT_CONTEXT_MODE};

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

pub const NAME: &str = "zep_get_thread_context";

/// Context modes the upstream understands.
const MODES: [&str; 2] = ["summary", "basic"];

#[derive(Debug, Deserialize)]
struct ContextParams {
    session_id: String,
    #[serde(default = "default_mode")]
    mode: String,
}

fn default_mode() -> String {
    DEFAULT_CONTEXT_MODE.to_string()
}

/// Return the tool definition for zep_get_thread_context.
pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_string(),
        description: Some(
            "Retrieve relevant context from all past threads for the current session. \
             This provides cross-thread memory, pulling in relevant information from \
             previous conversations. Use 'summary' mode for detailed context or 'basic' \
             for faster responses."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "session_id": {
                    "type": "string",
                    "description": "Thread/session identifier to get context for."
                },
                "mode": {
                    "type": "string",
                    "enum": MODES,
                    "description": "Context mode: 'summary' (detailed) or 'basic' (faster).",
                    "default": DEFAULT_CONTEXT_MODE
                }
            },
            "required": ["session_id"]
        }),
    }
}

/// Execute the zep_get_thread_context tool.
pub async fn execute(args: Value, client: &ZepClient) -> McpResult<ToolCallResult> {
    let params: ContextParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;
    if !MODES.contains(&params.mode.as_str()) {
        return Err(McpError::InvalidParams(format!(
            "mode must be one of summary, basic (got '{}')",
            params.mode
        )));
    }

    let result = client
        .get_thread_context(&params.session_id, &params.mode)
        .await?;
    Ok(ToolCallResult::json(&result))
}
