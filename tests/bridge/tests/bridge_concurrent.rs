//! Concurrent access: many agents sharing one server process.
//!
//! Tests verify that parallel tool calls share the identity cache, so the
//! user and each thread are provisioned once no matter how many calls race.

use std::sync::Arc;
use tokio::sync::Barrier;

use serde_json::json;
use zep_cloud::{InMemoryZepApi, Operation, ThreadQuery, ZepApi};
use zep_cloud_mcp::config::ServerConfig;
use zep_cloud_mcp::types::{JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, RequestId};
use zep_cloud_mcp::{ProtocolHandler, ServerContext};

// ─── Helpers ───────────────────────────────────────────────────────────────

fn create_handler(api: Arc<InMemoryZepApi>) -> ProtocolHandler {
    let config = ServerConfig {
        user_id: "bridge_user".to_string(),
        ..ServerConfig::default()
    };
    ProtocolHandler::new(Arc::new(ServerContext::with_api(api, &config)))
}

async fn init_handler(handler: &ProtocolHandler) {
    let init_req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: RequestId::Number(0),
        method: "initialize".to_string(),
        params: Some(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "1.0"}
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
    id: i64,
    name: &str,
    args: serde_json::Value,
) -> serde_json::Value {
    let req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: RequestId::Number(id),
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

// ─── Tests ─────────────────────────────────────────────────────────────────

/// Many writers on one thread provision it exactly once.
#[tokio::test]
async fn test_concurrent_writers_share_thread() {
    let api = Arc::new(InMemoryZepApi::new());
    let handler = Arc::new(create_handler(api.clone()));
    init_handler(&handler).await;

    let barrier = Arc::new(Barrier::new(8));
    let mut handles = vec![];

    for agent_num in 0..8i64 {
        let handler = handler.clone();
        let barrier = barrier.clone();

        handles.push(tokio::spawn(async move {
            barrier.wait().await; // Synchronize start

            let response = call_tool(
                &handler,
                agent_num + 1,
                "zep_store_memory",
                json!({
                    "session_id": "shared",
                    "content": format!("Agent {} reporting", agent_num),
                    "role": "user"
                }),
            )
            .await;

            let payload = parse_payload(&response);
            assert_eq!(payload["success"], true, "Agent {} failed", agent_num);
            agent_num
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(api.call_count(Operation::AddMessages).await, 8);
    let thread = api
        .get_thread("shared", ThreadQuery::default())
        .await
        .unwrap();
    assert_eq!(thread.messages.unwrap().len(), 8);

    // Racing calls may each try to create, but the upstream holds one of each
    // and later calls hit the cache.
    let creates_before = api.call_count(Operation::CreateThread).await;
    call_tool(
        &handler,
        100,
        "zep_store_memory",
        json!({"session_id": "shared", "content": "late"}),
    )
    .await;
    assert_eq!(api.call_count(Operation::CreateThread).await, creates_before);
}

/// Writers on distinct threads never see each other's messages.
#[tokio::test]
async fn test_concurrent_threads_stay_separate() {
    let api = Arc::new(InMemoryZepApi::new());
    let handler = Arc::new(create_handler(api.clone()));
    init_handler(&handler).await;

    let mut handles = vec![];
    for agent_num in 0..5i64 {
        let handler = handler.clone();
        handles.push(tokio::spawn(async move {
            let thread = format!("agent_{}", agent_num);
            for i in 0..3 {
                call_tool(
                    &handler,
                    agent_num * 10 + i,
                    "zep_store_memory",
                    json!({"session_id": &thread, "content": format!("step {}", i)}),
                )
                .await;
            }
            let read = call_tool(
                &handler,
                agent_num * 10 + 9,
                "zep_get_memory",
                json!({"session_id": &thread}),
            )
            .await;
            parse_payload(&read)
        }));
    }

    for (agent_num, handle) in handles.into_iter().enumerate() {
        let payload = handle.await.unwrap();
        assert_eq!(payload["thread_id"], format!("agent_{}", agent_num));
        assert_eq!(payload["message_count"], 3);
    }

    assert!(api.has_user("bridge_user").await);
}

/// Readers of the graph run alongside writers.
#[tokio::test]
async fn test_readers_alongside_writers() {
    let api = Arc::new(InMemoryZepApi::new());
    let a = api.add_node("bridge_user", "Ada", &["Person"], None).await;
    let b = api.add_node("bridge_user", "Engine", &["Thing"], None).await;
    api.add_edge("bridge_user", &a, &b, "BUILT", "Ada built the engine")
        .await;

    let handler = Arc::new(create_handler(api.clone()));
    init_handler(&handler).await;

    let mut handles = vec![];
    for agent_num in 0..6i64 {
        let handler = handler.clone();
        handles.push(tokio::spawn(async move {
            if agent_num % 2 == 0 {
                let response = call_tool(&handler, agent_num, "zep_get_graph_nodes", json!({})).await;
                assert_eq!(parse_payload(&response)["node_count"], 2);
            } else {
                let response = call_tool(
                    &handler,
                    agent_num,
                    "zep_search_memory",
                    json!({"query": "engine"}),
                )
                .await;
                assert_eq!(parse_payload(&response)["edge_count"], 1);
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}
