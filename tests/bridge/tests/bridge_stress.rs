//! Stress: long threads, paging, and a server running without a client.

use std::sync::Arc;

use serde_json::json;
use zep_cloud::InMemoryZepApi;
use zep_cloud_mcp::config::ServerConfig;
use zep_cloud_mcp::types::{JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, RequestId};
use zep_cloud_mcp::{ProtocolHandler, ServerContext};

// ─── Helpers ───────────────────────────────────────────────────────────────

fn create_handler(context: ServerContext) -> ProtocolHandler {
    ProtocolHandler::new(Arc::new(context))
}

fn in_memory_context() -> ServerContext {
    ServerContext::with_api(Arc::new(InMemoryZepApi::new()), &ServerConfig::default())
}

async fn init_handler(handler: &ProtocolHandler) {
    let init_req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: RequestId::Number(0),
        method: "initialize".to_string(),
        params: Some(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "stress", "version": "1.0"}
        })),
    };
    handler
        .handle_message(JsonRpcMessage::Request(init_req))
        .await;

    let init_notif = JsonRpcNotification {
        jsonrpc: "2.0".to_string(),
        method: "notifications/initialized".to_string(),
        params: None,
    };
    handler
        .handle_message(JsonRpcMessage::Notification(init_notif))
        .await;
}

async fn call_tool(
    handler: &ProtocolHandler,
    name: &str,
    args: serde_json::Value,
) -> serde_json::Value {
    let req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: RequestId::Number(1),
        method: "tools/call".to_string(),
        params: Some(json!({"name": name, "arguments": args})),
    };
    handler
        .handle_message(JsonRpcMessage::Request(req))
        .await
        .unwrap()
}

fn parse_payload(response: &serde_json::Value) -> serde_json::Value {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .expect("Expected text in tool response");
    serde_json::from_str(text).expect("Expected JSON in text")
}

fn contents(payload: &serde_json::Value) -> Vec<String> {
    payload["messages"]
        .as_array()
        .expect("Expected messages array")
        .iter()
        .map(|m| m["content"].as_str().unwrap_or_default().to_string())
        .collect()
}

// ─── Tests ─────────────────────────────────────────────────────────────────

/// A thousand messages, read back whole, by tail, and page by page.
#[tokio::test]
async fn test_long_thread_paging() {
    let handler = create_handler(in_memory_context());
    init_handler(&handler).await;

    for i in 0..1000 {
        let role = if i % 2 == 0 { "user" } else { "assistant" };
        let response = call_tool(
            &handler,
            "zep_store_memory",
            json!({"session_id": "long", "content": format!("message {}", i), "role": role}),
        )
        .await;
        assert_eq!(parse_payload(&response)["success"], true);
    }

    let all = parse_payload(&call_tool(&handler, "zep_get_memory", json!({"session_id": "long"})).await);
    assert_eq!(all["message_count"], 1000);

    let tail = parse_payload(
        &call_tool(
            &handler,
            "zep_get_memory",
            json!({"session_id": "long", "lastn": 3}),
        )
        .await,
    );
    assert_eq!(contents(&tail), vec!["message 997", "message 998", "message 999"]);

    // Walk the thread in pages of 250.
    let mut seen = 0;
    let mut cursor = 0;
    loop {
        let page = parse_payload(
            &call_tool(
                &handler,
                "zep_get_memory",
                json!({"session_id": "long", "limit": 250, "cursor": cursor}),
            )
            .await,
        );
        let count = page["message_count"].as_u64().unwrap();
        if count == 0 {
            break;
        }
        assert_eq!(contents(&page)[0], format!("message {}", seen));
        seen += count;
        cursor += count;
    }
    assert_eq!(seen, 1000);

    let users = parse_payload(
        &call_tool(
            &handler,
            "zep_get_memory",
            json!({"session_id": "long", "role_filter": "user"}),
        )
        .await,
    );
    assert_eq!(users["message_count"], 500);
}

/// A large graph listing respects its limit.
#[tokio::test]
async fn test_large_graph_listing() {
    let api = Arc::new(InMemoryZepApi::new());
    for i in 0..500 {
        api.add_node("default_user", &format!("Entity {}", i), &["Thing"], None)
            .await;
    }
    let handler = create_handler(ServerContext::with_api(api, &ServerConfig::default()));
    init_handler(&handler).await;

    let default_page = parse_payload(&call_tool(&handler, "zep_get_graph_nodes", json!({})).await);
    assert_eq!(default_page["node_count"], 50);

    let big_page = parse_payload(
        &call_tool(&handler, "zep_get_graph_nodes", json!({"limit": 400})).await,
    );
    assert_eq!(big_page["node_count"], 400);
}

/// Without a client the server keeps answering, one error per call.
#[tokio::test]
async fn test_degraded_server_keeps_serving() {
    let handler = create_handler(ServerContext::unavailable("missing API key"));
    init_handler(&handler).await;

    for i in 0..200 {
        let response = call_tool(
            &handler,
            "zep_store_memory",
            json!({"session_id": "s", "content": format!("attempt {}", i)}),
        )
        .await;
        assert_eq!(response["result"]["isError"], true);
        let payload = parse_payload(&response);
        assert!(payload["error"].as_str().unwrap().contains("ZEP_API_KEY"));
    }

    let list = handler
        .handle_message(JsonRpcMessage::Request(JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: RequestId::Number(999),
            method: "tools/list".to_string(),
            params: None,
        }))
        .await
        .unwrap();
    assert_eq!(list["result"]["tools"].as_array().unwrap().len(), 7);
}
