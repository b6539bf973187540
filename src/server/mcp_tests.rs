//! Unit tests for the stdio MCP transport.
//!
//! Requests go through [`McpServer::serve`] with in-memory streams, so
//! framing, notification handling and tool-call error mapping are all
//! exercised the way a client sees them.

use super::*;
use crate::assistant::MockAssistantApi;
use crate::config::Config;
use crate::planner::ContentType;
use crate::server::AppState;
use serde_json::json;
use std::sync::Arc;

fn server_with(mock: MockAssistantApi, default_space: Option<&str>) -> McpServer {
    let mut config = Config::default();
    config.run.default_space = default_space.map(str::to_string);
    McpServer::new(Arc::new(AppState::new(config, Arc::new(mock))))
}

fn test_server() -> McpServer {
    server_with(MockAssistantApi::new(), None)
}

/// Feed newline-separated messages and collect the decoded response lines.
async fn exchange(server: &McpServer, messages: &[String]) -> Vec<Value> {
    let input = messages.join("\n");
    let mut output: Vec<u8> = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn call(id: u64, tool: &str, arguments: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": tool, "arguments": arguments}
    })
    .to_string()
}

// ============================================================================
// Tool definitions
// ============================================================================

#[test]
fn test_run_tool_definition() {
    let tool = get_run_tool();

    assert_eq!(tool.name, "assistant_run");
    assert!(tool.description.contains("goal"));

    let schema = &tool.input_schema;
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["pages"]["type"], "array");
    let required = schema["required"].as_array().unwrap();
    assert!(required.contains(&json!("goal")));
    assert!(required.contains(&json!("pages")));
    assert!(!required.contains(&json!("space")));
}

#[test]
fn test_plan_tool_definition() {
    let tool = get_plan_tool();

    assert_eq!(tool.name, "assistant_plan");
    let content_types = &tool.input_schema["properties"]["pages"]["items"]["properties"]
        ["content_type"]["enum"];
    assert_eq!(content_types, &json!(["text", "code", "image", "video"]));
}

#[test]
fn test_history_tool_definitions() {
    let list = get_history_list_tool();
    assert!(list.input_schema["required"].is_null());

    let load = get_history_load_tool();
    assert_eq!(load.input_schema["required"], json!(["id"]));
}

// ============================================================================
// Framing and protocol methods
// ============================================================================

#[tokio::test]
async fn test_handshake_skips_notifications_and_blank_lines() {
    let server = test_server();
    let responses = exchange(
        &server,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}).to_string(),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
            "   ".to_string(),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}).to_string(),
            json!({"jsonrpc": "2.0", "id": "p", "method": "ping"}).to_string(),
        ],
    )
    .await;

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "mcp-goal-router");
    assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");

    let names: Vec<&str> = responses[1]["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "assistant_run",
            "assistant_plan",
            "assistant_history_list",
            "assistant_history_load"
        ]
    );

    assert_eq!(responses[2]["id"], "p");
    assert_eq!(responses[2]["result"], json!({}));
    assert!(responses[2].get("error").is_none());
}

#[tokio::test]
async fn test_malformed_line_is_parse_error() {
    let server = test_server();
    let responses = exchange(&server, &["{not json".to_string()]).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[0]["error"]["code"], error_codes::PARSE_ERROR);
    assert!(responses[0].get("result").is_none());
}

#[tokio::test]
async fn test_unknown_method() {
    let server = test_server();
    let response = server
        .handle_line(&json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"}).to_string())
        .await
        .unwrap();
    assert_eq!(response.error_code(), Some(error_codes::METHOD_NOT_FOUND));
}

#[tokio::test]
async fn test_tool_call_without_id_runs_nothing() {
    let mut mock = MockAssistantApi::new();
    mock.expect_page_type().never();
    let server = server_with(mock, Some("DOCS"));

    let notice = json!({
        "jsonrpc": "2.0",
        "method": "tools/call",
        "params": {"name": "assistant_run", "arguments": {"goal": "summarize this", "pages": ["Intro"]}}
    });
    assert!(exchange(&server, &[notice.to_string()]).await.is_empty());
}

// ============================================================================
// tools/call error mapping
// ============================================================================

#[tokio::test]
async fn test_unroutable_calls_are_protocol_errors() {
    let server = test_server();
    let responses = exchange(
        &server,
        &[
            call(1, "assistant_delete", json!({})),
            call(2, "assistant_run", json!({"pages": ["Intro"]})),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call"}).to_string(),
        ],
    )
    .await;

    for response in &responses {
        assert_eq!(response["error"]["code"], error_codes::INVALID_PARAMS);
    }
    assert_eq!(responses[0]["error"]["message"], "Unknown tool: assistant_delete");
    assert!(responses[1]["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid parameters for assistant_run"));
}

#[tokio::test]
async fn test_validation_failure_is_tool_error() {
    let server = test_server();
    let responses = exchange(
        &server,
        &[call(1, "assistant_run", json!({"goal": "summarize this", "pages": ["Intro"]}))],
    )
    .await;

    let result = &responses[0]["result"];
    assert_eq!(result["isError"], true);
    assert_eq!(
        result["content"][0]["text"],
        "Error: Validation failed: a space is required"
    );
}

#[tokio::test]
async fn test_missing_history_entry_is_tool_error() {
    let server = test_server();
    let response = server
        .handle_line(&call(4, "assistant_history_load", json!({"id": "nope"})))
        .await
        .unwrap();

    let result = response.result_value().unwrap();
    assert_eq!(result["isError"], true);
    assert_eq!(
        result["content"][0]["text"],
        "Error: Tool execution failed: History entry not found: nope"
    );
}

#[tokio::test]
async fn test_successful_run_then_history_list() {
    let mut mock = MockAssistantApi::new();
    mock.expect_page_type()
        .returning(|_, _| Ok(ContentType::Text));
    mock.expect_search()
        .times(1)
        .returning(|_, _, _| Ok("An overview.".to_string()));
    let server = server_with(mock, Some("DOCS"));

    let responses = exchange(
        &server,
        &[
            call(1, "assistant_run", json!({"goal": "summarize this", "pages": ["Intro"]})),
            call(2, "assistant_history_list", json!({})),
        ],
    )
    .await;

    let run = &responses[0]["result"];
    assert!(run.get("isError").is_none());
    let entry: Value = serde_json::from_str(run["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(entry["space"], "DOCS");
    assert_eq!(entry["tabs"][1]["title"], "Intro · AI Powered Search");

    let list: Value =
        serde_json::from_str(responses[1]["result"]["content"][0]["text"].as_str().unwrap())
            .unwrap();
    assert_eq!(list["total"], 1);
    assert_eq!(list["entries"][0]["id"], entry["id"]);
}

#[test]
fn test_protocol_error_code_split() {
    use crate::error::ValidationError;

    assert_eq!(
        protocol_error_code(&McpError::UnknownTool {
            tool_name: "x".to_string()
        }),
        Some(error_codes::INVALID_PARAMS)
    );
    assert_eq!(
        protocol_error_code(&McpError::Validation(ValidationError::NoPagesSelected)),
        None
    );
    assert_eq!(
        protocol_error_code(&McpError::ExecutionFailed {
            message: "boom".to_string()
        }),
        None
    );
}
