//! Tool catalog and dispatch: every tool called through the registry
//! against the in-process upstream.

mod common;

use serde_json::json;

use zep_cloud::{Operation, ZepError};
use zep_cloud_mcp::tools::ToolRegistry;

use common::fixtures::{create_test_context, create_unavailable_context, payload, TEST_USER};

const ALL_TOOLS: [&str; 7] = [
    "zep_store_memory",
    "zep_search_memory",
    "zep_get_memory",
    "zep_get_graph_nodes",
    "zep_get_graph_edges",
    "zep_get_node_details",
    "zep_get_thread_context",
];

#[test]
fn test_catalog_lists_every_tool_with_a_schema() {
    let tools = ToolRegistry::list_tools();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ALL_TOOLS);

    for tool in &tools {
        assert!(tool.description.is_some(), "{} has no description", tool.name);
        assert_eq!(tool.input_schema["type"], "object");
        assert!(
            tool.input_schema["properties"].is_object(),
            "{} has no properties",
            tool.name
        );
    }
}

#[test]
fn test_required_arguments_declared() {
    let tools = ToolRegistry::list_tools();
    let required = |name: &str| {
        tools
            .iter()
            .find(|t| t.name == name)
            .and_then(|t| t.input_schema["required"].as_array().cloned())
            .unwrap_or_default()
    };
    assert_eq!(required("zep_store_memory"), vec![json!("session_id"), json!("content")]);
    assert_eq!(required("zep_search_memory"), vec![json!("query")]);
    assert_eq!(required("zep_get_node_details"), vec![json!("node_uuid")]);
    assert!(required("zep_get_graph_nodes").is_empty());
}

#[tokio::test]
async fn test_store_memory_reports_what_was_stored() {
    let (context, api) = create_test_context();

    let result = ToolRegistry::dispatch(
        "zep_store_memory",
        Some(json!({"session_id": "s1", "content": "Hello", "role": "user"})),
        &context,
    )
    .await;

    assert!(result.is_error.is_none());
    let body = payload(&result);
    assert_eq!(body["success"], true);
    assert_eq!(body["thread_id"], "s1");
    assert_eq!(body["role"], "user");
    assert_eq!(body["content_length"], 5);
    assert!(api.has_user(TEST_USER).await);
    assert!(api.has_thread("s1").await);
}

#[tokio::test]
async fn test_store_memory_defaults_to_assistant() {
    let (context, _api) = create_test_context();

    let result = ToolRegistry::dispatch(
        "zep_store_memory",
        Some(json!({"session_id": "s1", "content": "Hi there"})),
        &context,
    )
    .await;

    assert_eq!(payload(&result)["role"], "assistant");
}

#[tokio::test]
async fn test_store_memory_is_idempotent_on_thread_creation() {
    let (context, api) = create_test_context();

    for content in ["one", "two", "three"] {
        let result = ToolRegistry::dispatch(
            "zep_store_memory",
            Some(json!({"session_id": "s1", "content": content})),
            &context,
        )
        .await;
        assert!(result.is_error.is_none());
    }

    assert_eq!(api.call_count(Operation::CreateUser).await, 1);
    assert_eq!(api.call_count(Operation::CreateThread).await, 1);
    assert_eq!(api.call_count(Operation::AddMessages).await, 3);
}

#[tokio::test]
async fn test_store_memory_rejects_bad_input() {
    let (context, _api) = create_test_context();

    let missing = ToolRegistry::dispatch(
        "zep_store_memory",
        Some(json!({"session_id": "s1"})),
        &context,
    )
    .await;
    assert_eq!(missing.is_error, Some(true));

    let bad_role = ToolRegistry::dispatch(
        "zep_store_memory",
        Some(json!({"session_id": "s1", "content": "x", "role": "robot"})),
        &context,
    )
    .await;
    assert_eq!(bad_role.is_error, Some(true));
}

#[tokio::test]
async fn test_empty_content_is_forwarded() {
    let (context, api) = create_test_context();

    let accepted = ToolRegistry::dispatch(
        "zep_store_memory",
        Some(json!({"session_id": "s1", "content": ""})),
        &context,
    )
    .await;
    assert!(accepted.is_error.is_none());
    assert_eq!(payload(&accepted)["content_length"], 0);
    assert_eq!(api.call_count(Operation::AddMessages).await, 1);

    api.fail_next(
        Operation::AddMessages,
        ZepError::Api {
            status: 400,
            message: "content is required".to_string(),
        },
    )
    .await;
    let rejected = ToolRegistry::dispatch(
        "zep_store_memory",
        Some(json!({"session_id": "s1", "content": ""})),
        &context,
    )
    .await;
    assert_eq!(rejected.is_error, Some(true));
    assert_eq!(
        payload(&rejected),
        json!({"error": "Zep API error (400): content is required"})
    );
}

#[tokio::test]
async fn test_store_memory_metadata_comes_back() {
    let (context, _api) = create_test_context();

    ToolRegistry::dispatch(
        "zep_store_memory",
        Some(json!({
            "session_id": "s1",
            "content": "Tagged",
            "metadata": {"k": 1, "source": "notes"}
        })),
        &context,
    )
    .await;

    let memory = payload(
        &ToolRegistry::dispatch("zep_get_memory", Some(json!({"session_id": "s1"})), &context)
            .await,
    );
    assert_eq!(
        memory["messages"][0]["metadata"],
        json!({"k": 1, "source": "notes"})
    );
}

#[tokio::test]
async fn test_get_memory_round_trip_and_role_filter() {
    let (context, _api) = create_test_context();

    for (content, role) in [("Hello", "user"), ("Hi! How can I help?", "assistant")] {
        ToolRegistry::dispatch(
            "zep_store_memory",
            Some(json!({"session_id": "s1", "content": content, "role": role})),
            &context,
        )
        .await;
    }

    let all = payload(
        &ToolRegistry::dispatch("zep_get_memory", Some(json!({"session_id": "s1"})), &context)
            .await,
    );
    assert_eq!(all["thread_id"], "s1");
    assert_eq!(all["message_count"], 2);
    assert_eq!(all["messages"][0]["content"], "Hello");
    assert_eq!(all["messages"][1]["role"], "assistant");

    let users = payload(
        &ToolRegistry::dispatch(
            "zep_get_memory",
            Some(json!({"session_id": "s1", "role_filter": "user"})),
            &context,
        )
        .await,
    );
    assert_eq!(users["message_count"], 1);
    assert_eq!(users["messages"][0]["role"], "user");

    // An empty filter is no filter.
    let unfiltered = payload(
        &ToolRegistry::dispatch(
            "zep_get_memory",
            Some(json!({"session_id": "s1", "role_filter": ""})),
            &context,
        )
        .await,
    );
    assert_eq!(unfiltered["message_count"], 2);
}

#[tokio::test]
async fn test_get_memory_lastn() {
    let (context, _api) = create_test_context();
    for i in 0..5 {
        ToolRegistry::dispatch(
            "zep_store_memory",
            Some(json!({"session_id": "s1", "content": format!("message {i}")})),
            &context,
        )
        .await;
    }

    let recent = payload(
        &ToolRegistry::dispatch(
            "zep_get_memory",
            Some(json!({"session_id": "s1", "lastn": 2})),
            &context,
        )
        .await,
    );
    assert_eq!(recent["message_count"], 2);
    assert_eq!(recent["messages"][1]["content"], "message 4");
}

#[tokio::test]
async fn test_get_memory_unknown_thread_is_an_error() {
    let (context, _api) = create_test_context();
    let result =
        ToolRegistry::dispatch("zep_get_memory", Some(json!({"session_id": "nope"})), &context)
            .await;
    assert_eq!(result.is_error, Some(true));
    assert!(payload(&result)["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_search_memory_finds_facts() {
    let (context, api) = create_test_context();
    let alice = api.add_node(TEST_USER, "Alice", &["Person"], Some("Likes tea")).await;
    let tea = api.add_node(TEST_USER, "Tea", &["Drink"], None).await;
    api.add_edge(TEST_USER, &alice, &tea, "LIKES", "Alice likes green tea")
        .await;

    let result = payload(
        &ToolRegistry::dispatch(
            "zep_search_memory",
            Some(json!({"query": "green tea"})),
            &context,
        )
        .await,
    );
    assert_eq!(result["query"], "green tea");
    assert_eq!(result["edge_count"], 1);
    assert_eq!(result["edges"][0]["fact"], "Alice likes green tea");
    assert!(result["edges"][0]["score"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_blank_query_is_forwarded() {
    let (context, api) = create_test_context();
    let result =
        ToolRegistry::dispatch("zep_search_memory", Some(json!({"query": "  "})), &context).await;
    assert!(result.is_error.is_none());
    assert_eq!(payload(&result)["query"], "  ");
    assert_eq!(api.call_count(Operation::SearchGraph).await, 1);
}

#[tokio::test]
async fn test_zero_limits_are_invalid() {
    let (context, api) = create_test_context();

    let cases = [
        ("zep_get_graph_nodes", json!({"limit": 0}), "limit"),
        ("zep_get_graph_edges", json!({"limit": 0}), "limit"),
        ("zep_search_memory", json!({"query": "tea", "limit": 0}), "limit"),
        ("zep_get_memory", json!({"session_id": "s1", "lastn": 0}), "lastn"),
        ("zep_get_memory", json!({"session_id": "s1", "limit": 0}), "limit"),
    ];
    for (name, args, field) in cases {
        let result = ToolRegistry::dispatch(name, Some(args), &context).await;
        assert_eq!(result.is_error, Some(true), "{name} accepted {field} 0");
        let message = payload(&result)["error"].as_str().unwrap().to_string();
        assert!(message.contains(&format!("{field} must be at least 1")), "{message}");
    }

    assert_eq!(api.call_count(Operation::NodesByUser).await, 0);
    assert_eq!(api.call_count(Operation::SearchGraph).await, 0);
    assert_eq!(api.call_count(Operation::GetThread).await, 0);
}

#[tokio::test]
async fn test_node_listing_feeds_node_details() {
    let (context, api) = create_test_context();
    let alice = api.add_node(TEST_USER, "Alice", &["Person"], None).await;
    let bob = api.add_node(TEST_USER, "Bob", &["Person"], None).await;
    api.add_edge(TEST_USER, &alice, &bob, "KNOWS", "Alice knows Bob")
        .await;
    api.add_episode(&alice, "Alice mentioned Bob at lunch").await;
    // Another user's graph stays invisible.
    api.add_node("someone_else", "Mallory", &[], None).await;

    let nodes = payload(
        &ToolRegistry::dispatch("zep_get_graph_nodes", Some(json!({})), &context).await,
    );
    assert_eq!(nodes["node_count"], 2);

    let listed = nodes["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["name"] == "Alice")
        .unwrap()
        .clone();

    let details = payload(
        &ToolRegistry::dispatch(
            "zep_get_node_details",
            Some(json!({"node_uuid": listed["uuid"]})),
            &context,
        )
        .await,
    );
    assert_eq!(details["node"]["name"], listed["name"]);
    assert_eq!(details["node"]["labels"], json!(["Person"]));
    assert_eq!(details["edge_count"], 1);
    assert_eq!(details["edges"][0]["fact"], "Alice knows Bob");
    assert_eq!(details["episode_count"], 1);

    let edges = payload(
        &ToolRegistry::dispatch("zep_get_graph_edges", Some(json!({"limit": 10})), &context)
            .await,
    );
    assert_eq!(edges["edge_count"], 1);
}

#[tokio::test]
async fn test_isolated_node_has_empty_details() {
    let (context, api) = create_test_context();
    let lonely = api.add_node(TEST_USER, "Lonely", &[], None).await;

    let details = payload(
        &ToolRegistry::dispatch(
            "zep_get_node_details",
            Some(json!({"node_uuid": lonely})),
            &context,
        )
        .await,
    );
    assert_eq!(details["edge_count"], 0);
    assert_eq!(details["edges"], json!([]));
    assert_eq!(details["episode_count"], 0);
    assert_eq!(details["episodes"], json!([]));
}

#[tokio::test]
async fn test_node_details_fails_whole_when_a_part_fails() {
    let (context, api) = create_test_context();
    let node = api.add_node(TEST_USER, "Alice", &[], None).await;
    api.fail_next(
        Operation::NodeEpisodes,
        ZepError::Api {
            status: 500,
            message: "episodes unavailable".to_string(),
        },
    )
    .await;

    let result = ToolRegistry::dispatch(
        "zep_get_node_details",
        Some(json!({"node_uuid": node})),
        &context,
    )
    .await;
    assert_eq!(result.is_error, Some(true));
    let body = payload(&result);
    assert!(body["error"].as_str().unwrap().contains("episodes unavailable"));
    assert!(body.get("node").is_none());
}

#[tokio::test]
async fn test_thread_context_modes() {
    let (context, api) = create_test_context();
    ToolRegistry::dispatch(
        "zep_store_memory",
        Some(json!({"session_id": "s1", "content": "I like tea", "role": "user"})),
        &context,
    )
    .await;

    let empty = payload(
        &ToolRegistry::dispatch(
            "zep_get_thread_context",
            Some(json!({"session_id": "s1"})),
            &context,
        )
        .await,
    );
    assert_eq!(empty["thread_id"], "s1");
    assert_eq!(empty["mode"], "summary");
    assert!(empty["context"].is_null());

    let a = api.add_node(TEST_USER, "User", &[], None).await;
    let b = api.add_node(TEST_USER, "Tea", &[], None).await;
    api.add_edge(TEST_USER, &a, &b, "LIKES", "User likes tea").await;

    let basic = payload(
        &ToolRegistry::dispatch(
            "zep_get_thread_context",
            Some(json!({"session_id": "s1", "mode": "basic"})),
            &context,
        )
        .await,
    );
    assert_eq!(basic["mode"], "basic");
    assert!(basic["context"].as_str().unwrap().contains("User likes tea"));
}

#[tokio::test]
async fn test_thread_context_rejects_unknown_mode() {
    let (context, api) = create_test_context();

    let result = ToolRegistry::dispatch(
        "zep_get_thread_context",
        Some(json!({"session_id": "s1", "mode": "bogus"})),
        &context,
    )
    .await;
    assert_eq!(result.is_error, Some(true));
    let message = payload(&result)["error"].as_str().unwrap().to_string();
    assert!(message.contains("mode must be one of summary, basic"), "{message}");
    assert_eq!(api.call_count(Operation::GetUserContext).await, 0);

    let schema = ToolRegistry::list_tools()
        .into_iter()
        .find(|t| t.name == "zep_get_thread_context")
        .unwrap()
        .input_schema;
    assert_eq!(schema["properties"]["mode"]["enum"], json!(["summary", "basic"]));
}

#[tokio::test]
async fn test_thread_context_on_fresh_thread() {
    let (context, api) = create_test_context();

    let result = ToolRegistry::dispatch(
        "zep_get_thread_context",
        Some(json!({"session_id": "fresh"})),
        &context,
    )
    .await;
    assert!(result.is_error.is_none());
    let body = payload(&result);
    assert_eq!(body["thread_id"], "fresh");
    assert!(body["context"].is_null());
    assert!(api.has_thread("fresh").await);
    assert_eq!(api.call_count(Operation::CreateThread).await, 1);
}

#[tokio::test]
async fn test_unknown_tool() {
    let (context, _api) = create_test_context();
    let result = ToolRegistry::dispatch("zep_delete_everything", None, &context).await;
    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        payload(&result),
        json!({"error": "Unknown tool: zep_delete_everything"})
    );
}

#[tokio::test]
async fn test_unavailable_client_fails_every_tool() {
    let context = create_unavailable_context();

    for name in ALL_TOOLS {
        let result = ToolRegistry::dispatch(name, Some(json!({})), &context).await;
        assert_eq!(result.is_error, Some(true), "{name} should fail");
        let message = payload(&result)["error"].as_str().unwrap().to_string();
        assert!(message.contains("ZEP_API_KEY"), "{name}: {message}");
    }
}

#[tokio::test]
async fn test_provisioning_failure_is_tolerated() {
    let (context, api) = create_test_context();
    api.fail_next(
        Operation::CreateUser,
        ZepError::Api {
            status: 500,
            message: "hiccup".to_string(),
        },
    )
    .await;

    // The user create fails, so the thread create hits a missing user and is
    // tolerated too; only the message append reports the problem.
    let first = ToolRegistry::dispatch(
        "zep_store_memory",
        Some(json!({"session_id": "s1", "content": "hello"})),
        &context,
    )
    .await;
    assert_eq!(first.is_error, Some(true));

    // Nothing was cached, so the next call provisions again and succeeds.
    let second = ToolRegistry::dispatch(
        "zep_store_memory",
        Some(json!({"session_id": "s1", "content": "hello"})),
        &context,
    )
    .await;
    assert!(second.is_error.is_none());
    assert_eq!(api.call_count(Operation::CreateUser).await, 2);
}
