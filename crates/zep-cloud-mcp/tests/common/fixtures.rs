//! Test data fixtures for MCP server tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};

use zep_cloud::InMemoryZepApi;
use zep_cloud_mcp::config::ServerConfig;
use zep_cloud_mcp::types::{
    JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, RequestId, ToolCallResult,
};
use zep_cloud_mcp::{ProtocolHandler, ServerContext};

pub const TEST_USER: &str = "test_user";

/// Configuration pointing at the test user.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        api_key: Some("test-key".to_string()),
        user_id: TEST_USER.to_string(),
        ..ServerConfig::default()
    }
}

/// A ready context over a fresh in-process upstream. The upstream is returned
/// too so tests can seed it and inspect it.
pub fn create_test_context() -> (Arc<ServerContext>, Arc<InMemoryZepApi>) {
    let api = Arc::new(InMemoryZepApi::new());
    let context = ServerContext::with_api(api.clone(), &test_config());
    (Arc::new(context), api)
}

/// A context whose client failed to build.
pub fn create_unavailable_context() -> Arc<ServerContext> {
    Arc::new(ServerContext::unavailable("missing API key"))
}

/// Parse a tool result's text payload.
pub fn payload(result: &ToolCallResult) -> Value {
    result
        .payload()
        .expect("tool result should carry a JSON text payload")
}

pub fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcMessage {
    JsonRpcMessage::Request(JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: RequestId::Number(id),
        method: method.to_string(),
        params,
    })
}

pub fn notification(method: &str, params: Option<Value>) -> JsonRpcMessage {
    JsonRpcMessage::Notification(JsonRpcNotification::new(method.to_string(), params))
}

/// Run the initialize handshake.
pub async fn init_handler(handler: &ProtocolHandler) {
    handler
        .handle_message(request(
            0,
            "initialize",
            Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test", "version": "1.0"}
            })),
        ))
        .await;
    handler
        .handle_message(notification("notifications/initialized", None))
        .await;
}

/// Call a tool through the protocol handler and return the raw response.
pub async fn call_tool(handler: &ProtocolHandler, id: i64, name: &str, args: Value) -> Value {
    handler
        .handle_message(request(
            id,
            "tools/call",
            Some(json!({"name": name, "arguments": args})),
        ))
        .await
        .expect("tools/call always produces a response")
}

/// The JSON payload inside a tools/call response.
pub fn response_payload(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .expect("response should carry text content");
    serde_json::from_str(text).expect("text content should be JSON")
}
