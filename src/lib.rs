//! # MCP Goal Router
//!
//! A Model Context Protocol (MCP) server that turns a free-text goal over a
//! handful of knowledge-space pages into concrete tool calls against a remote
//! assistant API, then assembles the outputs into a reasoning narrative and
//! per-result tabs.
//!
//! ## Pipeline
//!
//! - **Decomposition**: split the goal into instructions and sub-actions
//! - **Classification**: ordered keyword rules map text to a tool
//! - **Matching**: exactly one instruction and tool per page, biased by content type
//! - **Execution**: search, code assistant, image insights, video summarizer
//! - **Pairwise**: impact analysis and test strategy when exactly two pages are selected
//! - **Aggregation**: reasoning narrative, display tabs and in-memory history
//!
//! ## Architecture
//!
//! ```text
//! MCP Client → MCP Server (Rust) → Assistant API (HTTP)
//!                    ↓
//!           History (in memory)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mcp_goal_router::{Config, AppState, McpServer};
//! use mcp_goal_router::assistant::AssistantClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = AssistantClient::new(&config.assistant, config.request.clone())?;
//!     let state = Arc::new(AppState::new(config, Arc::new(client)));
//!     McpServer::new(state).run().await?;
//!     Ok(())
//! }
//! ```

/// Remote assistant API client and wire types.
pub mod assistant;
/// Configuration management for the MCP server.
pub mod config;
/// Goal runs: validation, execution order and result aggregation.
pub mod engine;
/// Error types and result aliases for the application.
pub mod error;
/// Per-page tools and the two-page analyzers.
pub mod executors;
/// In-memory history of successful runs.
pub mod history;
/// Goal splitting, tool classification and page matching.
pub mod planner;
/// Instruction templates sent to the code assistant.
pub mod prompts;
/// MCP server implementation and request handling.
pub mod server;

pub use config::Config;
pub use engine::{GoalEngine, RunContext, RunResult};
pub use error::{AppError, AppResult};
pub use server::{AppState, McpServer, SharedState};
