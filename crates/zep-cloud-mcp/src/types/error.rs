//! MCP error types and JSON-RPC error codes.

use thiserror::Error;
use zep_cloud::ZepError;

use super::message::{JsonRpcError, RequestId};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Server-defined error codes.
pub mod mcp_error_codes {
    pub const REQUEST_CANCELLED: i32 = -32800;
    pub const TOOL_NOT_FOUND: i32 = -32803;
    pub const CLIENT_UNAVAILABLE: i32 = -32850;
    pub const UPSTREAM_ERROR: i32 = -32851;
    pub const CONFIG_ERROR: i32 = -32852;
}

/// Errors raised while serving MCP requests.
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    /// The Zep client could not be built at startup.
    #[error("Zep client not initialized: {0}. Check ZEP_API_KEY.")]
    ClientUnavailable(String),

    /// Upstream failures keep the upstream message verbatim.
    #[error("{0}")]
    Zep(#[from] ZepError),

    #[error("Request cancelled: {0}")]
    Cancelled(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    /// JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) | McpError::Json(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::InternalError(_) | McpError::Io(_) | McpError::Transport(_) => {
                INTERNAL_ERROR
            }
            McpError::ToolNotFound(_) => TOOL_NOT_FOUND,
            McpError::ClientUnavailable(_) => CLIENT_UNAVAILABLE,
            McpError::Zep(_) => UPSTREAM_ERROR,
            McpError::Cancelled(_) => REQUEST_CANCELLED,
            McpError::Config(_) => CONFIG_ERROR,
        }
    }

    /// Convert into a JSON-RPC error response for `id`.
    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError::new(id, self.code(), self.to_string())
    }
}

/// Convenience result alias.
pub type McpResult<T> = Result<T, McpError>;
