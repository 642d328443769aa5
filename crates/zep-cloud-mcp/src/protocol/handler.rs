//! Routes JSON-RPC messages to the handshake, the tool registry, and
//! cancellation bookkeeping.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::{oneshot, Mutex};

use crate::context::ServerContext;
use crate::tools::ToolRegistry;
use crate::types::{
    CancelledParams, InitializeParams, JsonRpcError, JsonRpcMessage, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, ListParams, McpError, McpResult, RequestId, ToolCallParams,
    ToolCallResult, ToolListResult,
};

use super::negotiation::NegotiatedCapabilities;
use super::validator::validate_request;

/// Handles every message for one connection.
pub struct ProtocolHandler {
    context: Arc<ServerContext>,
    capabilities: Mutex<NegotiatedCapabilities>,
    in_flight: Mutex<HashMap<RequestId, oneshot::Sender<String>>>,
}

impl ProtocolHandler {
    pub fn new(context: Arc<ServerContext>) -> Self {
        Self {
            context,
            capabilities: Mutex::new(NegotiatedCapabilities::default()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// The shared server context.
    pub fn context(&self) -> &Arc<ServerContext> {
        &self.context
    }

    /// Parse and handle one raw line. Returns the response to write, if any.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        match JsonRpcMessage::parse(line) {
            Ok(msg) => self.handle_message(msg).await,
            Err(e) => {
                tracing::warn!("Discarding unparsable message: {e}");
                Some(error_value(e.to_json_rpc_error(RequestId::Null)))
            }
        }
    }

    /// Handle one message. Requests always produce a response; notifications
    /// and stray responses never do.
    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(request) => Some(self.handle_request(request).await),
            JsonRpcMessage::Notification(notification) => {
                self.handle_notification(notification).await;
                None
            }
            JsonRpcMessage::Response(_) | JsonRpcMessage::Error(_) => {
                tracing::debug!("Ignoring response message from client");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        let id = request.id.clone();
        tracing::debug!("Request {id}: {}", request.method);

        match self.route(request).await {
            Ok(result) => serde_json::to_value(JsonRpcResponse::new(id.clone(), result))
                .unwrap_or_else(|e| {
                    error_value(McpError::Json(e).to_json_rpc_error(id))
                }),
            Err(e) => {
                tracing::warn!("Request {id} failed: {e}");
                error_value(e.to_json_rpc_error(id))
            }
        }
    }

    async fn route(&self, request: JsonRpcRequest) -> McpResult<Value> {
        validate_request(&request)?;

        match request.method.as_str() {
            "initialize" => {
                let params: InitializeParams = parse_params(request.params)?;
                let result = self.capabilities.lock().await.negotiate(params)?;
                Ok(serde_json::to_value(result)?)
            }
            "ping" => Ok(json!({})),
            "tools/list" => {
                self.capabilities.lock().await.ensure_negotiated()?;
                // Single page; any cursor is accepted and ignored.
                let _: ListParams = parse_params_or_default(request.params)?;
                let result = ToolListResult {
                    tools: ToolRegistry::list_tools(),
                    next_cursor: None,
                };
                Ok(serde_json::to_value(result)?)
            }
            "tools/call" => {
                self.capabilities.lock().await.ensure_negotiated()?;
                let params: ToolCallParams = parse_params(request.params)?;
                let result = self.call_tool(request.id, params).await?;
                Ok(serde_json::to_value(result)?)
            }
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    /// Run a tool call that can be abandoned by a cancellation notification.
    ///
    /// An id that is already in flight is rejected so the running call keeps
    /// its cancel handle.
    async fn call_tool(&self, id: RequestId, params: ToolCallParams) -> McpResult<ToolCallResult> {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight.contains_key(&id) {
                return Err(McpError::InvalidRequest(format!(
                    "Request id {id} is already in flight"
                )));
            }
            in_flight.insert(id.clone(), cancel_tx);
        }

        let result = tokio::select! {
            result = ToolRegistry::dispatch(&params.name, params.arguments, &self.context) => result,
            Ok(reason) = cancel_rx => {
                tracing::info!("Tool call {id} ({}) cancelled: {reason}", params.name);
                ToolCallResult::error(&McpError::Cancelled(reason).to_string())
            }
        };

        self.in_flight.lock().await.remove(&id);
        Ok(result)
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" | "initialized" => {
                self.capabilities.lock().await.mark_initialized();
            }
            "notifications/cancelled" | "$/cancelRequest" => {
                match parse_params::<CancelledParams>(notification.params) {
                    Ok(params) => self.cancel(params).await,
                    Err(e) => tracing::warn!("Malformed cancellation: {e}"),
                }
            }
            other => tracing::debug!("Ignoring notification {other}"),
        }
    }

    async fn cancel(&self, params: CancelledParams) {
        let Some(id) = RequestId::from_value(&params.request_id) else {
            tracing::warn!("Cancellation names an invalid request id");
            return;
        };
        let reason = params
            .reason
            .unwrap_or_else(|| "cancelled by client".to_string());

        match self.in_flight.lock().await.remove(&id) {
            Some(tx) => {
                let _ = tx.send(reason);
            }
            None => tracing::debug!("Cancellation for {id} arrived after it finished"),
        }
    }

    /// Number of tool calls currently running.
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> McpResult<T> {
    let params = params.ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))?;
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn parse_params_or_default<T: serde::de::DeserializeOwned + Default>(
    params: Option<Value>,
) -> McpResult<T> {
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        Some(params) => {
            serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
        }
    }
}

fn error_value(error: JsonRpcError) -> Value {
    serde_json::to_value(error).unwrap_or(Value::Null)
}
