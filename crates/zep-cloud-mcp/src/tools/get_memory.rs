//! Tool: zep_get_memory — Read messages back from a thread.
//!
//! The only tool with post-processing: `role_filter` is applied here, after
//! the upstream read, and `message_count` is recomputed to match.

use serde::Deserialize;
use serde_json::{json, Value};

use zep_cloud::{Role, ThreadQuery, ZepClient};

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

pub const NAME: &str = "zep_get_memory";

#[derive(Debug, Deserialize)]
struct GetMemoryParams {
    session_id: String,
    lastn: Option<u32>,
    limit: Option<u32>,
    cursor: Option<u64>,
    role_filter: Option<String>,
}

/// Return the tool definition for zep_get_memory.
pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_string(),
        description: Some(
            "Retrieve messages from a memory thread. Supports pagination and filtering \
             by role. Use lastn for the N most recent messages, or limit+cursor for pagination."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "session_id": {
                    "type": "string",
                    "description": "Thread/session identifier to retrieve messages from."
                },
                "lastn": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Return the N most recent messages (overrides limit/cursor)."
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Maximum number of messages to return (use with cursor for pagination)."
                },
                "cursor": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Pagination cursor (use with limit)."
                },
                "role_filter": {
                    "type": "string",
                    "enum": ["user", "assistant", "system"],
                    "description": "Filter messages by role: 'user', 'assistant', or 'system'."
                }
            },
            "required": ["session_id"]
        }),
    }
}

/// Execute the zep_get_memory tool.
pub async fn execute(args: Value, client: &ZepClient) -> McpResult<ToolCallResult> {
    let params: GetMemoryParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;
    super::require_positive("lastn", params.lastn)?;
    super::require_positive("limit", params.limit)?;

    // An empty filter means no filter.
    let role_filter = match params.role_filter.as_deref() {
        None | Some("") => None,
        Some(name) => Some(Role::from_name(name).ok_or_else(|| {
            McpError::InvalidParams(format!(
                "role_filter must be one of user, assistant, system (got '{name}')"
            ))
        })?),
    };

    let query = ThreadQuery {
        lastn: params.lastn,
        limit: params.limit,
        cursor: params.cursor,
    };
    let mut result = client.get_memory(&params.session_id, query).await?;

    if let Some(role) = role_filter {
        result.retain_role(role.as_str());
    }

    Ok(ToolCallResult::json(&result))
}
