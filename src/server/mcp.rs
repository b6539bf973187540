//! MCP transport: newline-delimited JSON-RPC 2.0 over stdio.
//!
//! Tool failures that belong to the goal (validation, a failed run, an
//! unknown history id) are returned as `isError` tool results. Calls the
//! server cannot route at all are JSON-RPC errors.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use super::{handle_tool_call, SharedState};
use crate::error::{McpError, McpResult};

#[cfg(test)]
#[path = "mcp_tests.rs"]
mod mcp_tests;

const JSONRPC_VERSION: &str = "2.0";
const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "mcp-goal-router";

/// JSON-RPC error codes emitted by the server.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Incoming message. A missing id marks a notification.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    pub id: Value,
    #[serde(flatten)]
    pub outcome: RpcOutcome,
}

/// Serialized as either a `result` or an `error` member.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcOutcome {
    Result(Value),
    Error(RpcError),
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: RpcOutcome::Result(result),
        }
    }

    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: RpcOutcome::Error(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// The result member, if the call succeeded at the protocol level.
    pub fn result_value(&self) -> Option<&Value> {
        match &self.outcome {
            RpcOutcome::Result(value) => Some(value),
            RpcOutcome::Error(_) => None,
        }
    }

    pub fn error_code(&self) -> Option<i32> {
        match &self.outcome {
            RpcOutcome::Result(_) => None,
            RpcOutcome::Error(err) => Some(err.code),
        }
    }
}

/// MCP tool definition with JSON Schema.
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Protocol-level code for errors that mean the call was never routed;
/// `None` for failures reported inside the tool result.
fn protocol_error_code(err: &McpError) -> Option<i32> {
    match err {
        McpError::UnknownTool { .. } | McpError::InvalidParameters { .. } => {
            Some(error_codes::INVALID_PARAMS)
        }
        McpError::Json(_) => Some(error_codes::INTERNAL_ERROR),
        McpError::Validation(_) | McpError::ExecutionFailed { .. } => None,
    }
}

fn tool_content(text: String, is_error: bool) -> Value {
    let mut content = json!({ "content": [{ "type": "text", "text": text }] });
    if is_error {
        content["isError"] = Value::Bool(true);
    }
    content
}

fn tool_call_response(id: Value, tool: &str, outcome: McpResult<Value>) -> JsonRpcResponse {
    match outcome {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => JsonRpcResponse::result(id, tool_content(text, false)),
            Err(e) => {
                error!(tool = %tool, error = %e, "Failed to serialize tool result");
                JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string())
            }
        },
        Err(err) => match protocol_error_code(&err) {
            Some(code) => {
                warn!(tool = %tool, code, error = %err, "Tool call rejected");
                JsonRpcResponse::error(id, code, err.to_string())
            }
            None => {
                warn!(tool = %tool, error = %err, "Tool call failed");
                JsonRpcResponse::result(id, tool_content(format!("Error: {}", err), true))
            }
        },
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

/// MCP server over any line-oriented byte stream; [`McpServer::run`] binds stdio.
pub struct McpServer {
    state: SharedState,
}

impl McpServer {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Serve stdin/stdout until EOF.
    pub async fn run(&self) -> std::io::Result<()> {
        info!("MCP goal router starting...");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Answer one response line per request line until the reader is exhausted.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let Some(response) = self.handle_line(&line).await else {
                continue;
            };
            let encoded = serde_json::to_string(&response)?;
            debug!(response = %encoded, "Sending response");

            writer.write_all(encoded.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        info!("EOF received, shutting down");
        Ok(())
    }

    async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        debug!(request = %line, "Received request");

        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                error!(error = %e, "Failed to parse request");
                Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            debug!(method = %request.method, "Notification received");
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => {
                info!("Handling initialize request");
                JsonRpcResponse::result(id, initialize_result())
            }
            "tools/list" => JsonRpcResponse::result(id, json!({ "tools": tool_definitions() })),
            "tools/call" => self.call_tool(id, request.params).await,
            "ping" => JsonRpcResponse::result(id, json!({})),
            method => {
                warn!(method = %method, "Unknown method");
                JsonRpcResponse::error(
                    id,
                    error_codes::METHOD_NOT_FOUND,
                    format!("Method not found: {}", method),
                )
            }
        };
        Some(response)
    }

    async fn call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params = params.map(serde_json::from_value::<ToolCallParams>);
        let params = match params {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                )
            }
            None => return JsonRpcResponse::error(id, error_codes::INVALID_PARAMS, "Missing params"),
        };

        info!(tool = %params.name, "Handling tool call");
        let outcome = handle_tool_call(&self.state, &params.name, params.arguments).await;
        tool_call_response(id, &params.name, outcome)
    }
}

/// Every tool the server exposes, in listing order.
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        get_run_tool(),
        get_plan_tool(),
        get_history_list_tool(),
        get_history_load_tool(),
    ]
}

fn get_run_tool() -> Tool {
    Tool {
        name: "assistant_run".to_string(),
        description: "Decompose a natural-language goal into per-page instructions, route each page to the best tool (search, code assistant, image insights, video summarizer) and, with exactly two pages, run impact analysis or test-strategy generation when asked. Returns the reasoning narrative and one tab per result.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "goal": {
                    "type": "string",
                    "description": "What to do with the selected pages"
                },
                "space": {
                    "type": "string",
                    "description": "Knowledge space containing the pages (defaults to DEFAULT_SPACE)"
                },
                "pages": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "description": "Page titles in selection order; with two pages the first is treated as old/code and the second as new/test input"
                }
            },
            "required": ["goal", "pages"]
        }),
    }
}

fn get_plan_tool() -> Tool {
    Tool {
        name: "assistant_plan".to_string(),
        description: "Show how a goal would be split and routed without calling any tool. Pages carry their content type (text, code, image, video).".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "goal": {
                    "type": "string",
                    "description": "Goal to decompose"
                },
                "pages": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "content_type": {
                                "type": "string",
                                "enum": ["text", "code", "image", "video"],
                                "default": "text"
                            }
                        },
                        "required": ["title"]
                    }
                }
            },
            "required": ["goal", "pages"]
        }),
    }
}

fn get_history_list_tool() -> Tool {
    Tool {
        name: "assistant_history_list".to_string(),
        description: "List past successful runs, most recent first.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        }),
    }
}

fn get_history_load_tool() -> Tool {
    Tool {
        name: "assistant_history_load".to_string(),
        description: "Restore a past run by id, including its goal, pages and result tabs.".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "History entry id returned by assistant_run or assistant_history_list"
                }
            },
            "required": ["id"],
            "additionalProperties": false
        }),
    }
}
