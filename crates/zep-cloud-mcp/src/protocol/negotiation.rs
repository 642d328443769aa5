//! MCP capability negotiation during initialization.

use crate::types::{
    ClientCapabilities, Implementation, InitializeParams, InitializeResult, McpError, McpResult,
    MCP_VERSION,
};

/// Handshake state for one connection.
#[derive(Debug, Clone, Default)]
pub struct NegotiatedCapabilities {
    /// The client's declared capabilities.
    pub client: ClientCapabilities,
    /// Who is on the other end, once known.
    pub client_info: Option<Implementation>,
    /// Set once the `initialize` request has been answered.
    pub negotiated: bool,
    /// Set by the client's `initialized` notification.
    pub initialized: bool,
}

impl NegotiatedCapabilities {
    /// Process an initialize request and return the result.
    pub fn negotiate(&mut self, params: InitializeParams) -> McpResult<InitializeResult> {
        if params.protocol_version != MCP_VERSION {
            tracing::warn!(
                "Client requested protocol version {}, server supports {}. Proceeding with server version.",
                params.protocol_version,
                MCP_VERSION
            );
        }

        tracing::info!(
            "Initialized with client: {} v{}",
            params.client_info.name,
            params.client_info.version
        );

        self.client = params.capabilities;
        self.client_info = Some(params.client_info);
        self.negotiated = true;

        Ok(InitializeResult::default_result())
    }

    /// Mark the handshake as complete (after receiving `initialized` notification).
    pub fn mark_initialized(&mut self) {
        if !self.negotiated {
            tracing::warn!("Received 'initialized' before 'initialize'");
        }
        self.initialized = true;
        tracing::info!("MCP handshake complete");
    }

    /// Reject requests that arrive before `initialize`.
    pub fn ensure_negotiated(&self) -> McpResult<()> {
        if !self.negotiated {
            return Err(McpError::InvalidRequest(
                "Server not yet initialized. Send 'initialize' first.".to_string(),
            ));
        }
        Ok(())
    }
}
