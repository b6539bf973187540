use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::SharedState;
use crate::engine::{plan_goal, validate_goal, RunContext};
use crate::error::{AppError, McpError, McpResult};
use crate::history::HistoryEntry;
use crate::planner::Page;

/// Route tool calls to appropriate handlers
pub async fn handle_tool_call(
    state: &SharedState,
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<Value> {
    info!(tool = %tool_name, "Routing tool call");

    match tool_name {
        "assistant_run" => handle_run(state, arguments).await,
        "assistant_plan" => handle_plan(state, arguments).await,
        "assistant_history_list" => handle_history_list(state),
        "assistant_history_load" => handle_history_load(state, arguments).await,
        _ => Err(McpError::UnknownTool {
            tool_name: tool_name.to_string(),
        }),
    }
}

/// Arguments for `assistant_run`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunParams {
    pub goal: String,
    /// Falls back to the configured default space.
    #[serde(default)]
    pub space: Option<String>,
    #[serde(default)]
    pub pages: Vec<String>,
}

/// Arguments for `assistant_plan`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanParams {
    pub goal: String,
    /// Pages with known content types; missing types are treated as text.
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct LoadParams {
    id: String,
}

/// Handle assistant_run: execute a goal and record it on success
async fn handle_run(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    execute_handler("assistant_run", arguments, |params: RunParams| async move {
        let space = params
            .space
            .filter(|s| !s.trim().is_empty())
            .or_else(|| state.config.run.default_space.clone())
            .unwrap_or_default();
        let ctx = RunContext::new(params.goal, space, params.pages);
        let entry = state.engine.run_and_record(&ctx, &state.history).await?;
        Ok::<_, AppError>(HistoryEntry::clone(&entry))
    })
    .await
}

/// Handle assistant_plan: show routing decisions without calling any tool
async fn handle_plan(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: PlanParams = parse_arguments("assistant_plan", arguments)?;
    validate_goal(&params.goal)?;
    let report = plan_goal(&params.goal, &params.pages, state.engine.classifier());
    serde_json::to_value(report).map_err(McpError::Json)
}

/// Handle assistant_history_list: summaries, most recent first
fn handle_history_list(state: &SharedState) -> McpResult<Value> {
    #[derive(Serialize)]
    struct HistoryList<T> {
        total: usize,
        entries: Vec<T>,
    }

    let entries = state.history.summaries();
    serde_json::to_value(HistoryList {
        total: entries.len(),
        entries,
    })
    .map_err(McpError::Json)
}

/// Handle assistant_history_load: restore a past run with its tabs
async fn handle_history_load(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    execute_handler("assistant_history_load", arguments, |params: LoadParams| async move {
        let entry = state.history.load(&params.id)?;
        Ok::<_, AppError>(HistoryEntry::clone(&entry))
    })
    .await
}

fn parse_arguments<T: serde::de::DeserializeOwned>(
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<T> {
    match arguments {
        Some(args) => serde_json::from_value(args).map_err(|e| McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: e.to_string(),
        }),
        None => Err(McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: "Missing arguments".to_string(),
        }),
    }
}

/// Parse arguments, run the operation and serialize its result.
///
/// Operation errors keep the validation/execution split of [`McpError`].
async fn execute_handler<P, R, E, F, Fut>(
    tool_name: &str,
    arguments: Option<Value>,
    operation: F,
) -> McpResult<Value>
where
    P: serde::de::DeserializeOwned,
    R: Serialize,
    E: Into<McpError>,
    F: FnOnce(P) -> Fut,
    Fut: std::future::Future<Output = Result<R, E>>,
{
    let params: P = parse_arguments(tool_name, arguments)?;

    let result = operation(params).await.map_err(Into::into)?;

    serde_json::to_value(result).map_err(McpError::Json)
}
