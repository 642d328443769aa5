//! Structural checks on incoming JSON-RPC messages.

use crate::types::{JsonRpcRequest, McpError, McpResult, JSONRPC_VERSION};

/// Validate the envelope of a request before it is routed.
pub fn validate_request(request: &JsonRpcRequest) -> McpResult<()> {
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(McpError::InvalidRequest(format!(
            "Unsupported jsonrpc version '{}'",
            request.jsonrpc
        )));
    }
    if request.method.trim().is_empty() {
        return Err(McpError::InvalidRequest("Empty method name".to_string()));
    }
    if let Some(params) = &request.params {
        if !params.is_object() && !params.is_null() {
            return Err(McpError::InvalidRequest(
                "params must be an object".to_string(),
            ));
        }
    }
    Ok(())
}
